use colored::*;
use prettytable::{cell, row, Row};

use super::table::ToRow;
use crate::models::Destination;
use crate::worker::PathOp;

pub struct DestinationRow(pub Destination);

impl ToRow for DestinationRow {
    fn columns() -> Row {
        row!["Prefix", "Next Hop", "Family"]
    }

    fn to_row(&self) -> Row {
        let dest = &self.0;
        row![dest.cidr(), dest.next_hop, dest.family()]
    }
}

/// A pending change, `+` for announcements and `-` for withdrawals
pub struct ChangeRow(pub PathOp, pub Destination);

impl ToRow for ChangeRow {
    fn columns() -> Row {
        row!["", "Prefix", "Next Hop", "Family"]
    }

    fn to_row(&self) -> Row {
        let dest = &self.1;
        let marker = match self.0 {
            PathOp::Add => "+".green(),
            PathOp::Remove => "-".red(),
        };
        row![marker, dest.cidr(), dest.next_hop, dest.family()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_row() {
        let dest: Destination = "10.0.0.0/24 -> 10.0.0.1".parse().unwrap();
        let row = DestinationRow(dest).to_row();
        assert_eq!(row.len(), DestinationRow::columns().len());
        assert_eq!(row.get_cell(0).unwrap().get_content(), "10.0.0.0/24");
        assert_eq!(row.get_cell(1).unwrap().get_content(), "10.0.0.1");
        assert_eq!(row.get_cell(2).unwrap().get_content(), "IPv4 Unicast");
    }

    #[test]
    fn test_change_row() {
        colored::control::set_override(false);
        let dest: Destination = "3001:db8::/64 -> 3001::1".parse().unwrap();
        let row = ChangeRow(PathOp::Remove, dest).to_row();
        assert_eq!(row.get_cell(0).unwrap().get_content(), "-");
        assert_eq!(row.get_cell(3).unwrap().get_content(), "IPv6 Unicast");
    }
}
