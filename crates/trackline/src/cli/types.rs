//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::TicketType;

/// Ticket type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketTypeArg {
    /// Parent container for stories and tasks
    Epic,
    /// User-facing piece of functionality
    Story,
    /// General task
    Task,
    /// Defect
    Bug,
}

impl From<TicketTypeArg> for TicketType {
    fn from(arg: TicketTypeArg) -> Self {
        match arg {
            TicketTypeArg::Epic => TicketType::Epic,
            TicketTypeArg::Story => TicketType::Story,
            TicketTypeArg::Task => TicketType::Task,
            TicketTypeArg::Bug => TicketType::Bug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TicketTypeArg::Epic, TicketType::Epic)]
    #[case(TicketTypeArg::Story, TicketType::Story)]
    #[case(TicketTypeArg::Task, TicketType::Task)]
    #[case(TicketTypeArg::Bug, TicketType::Bug)]
    fn test_ticket_type_conversion(#[case] arg: TicketTypeArg, #[case] expected: TicketType) {
        assert_eq!(TicketType::from(arg), expected);
    }
}
