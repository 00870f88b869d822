pub mod conversation;
pub mod evaluator;
pub mod report;
pub mod rule_table;

pub use conversation::ConversationEngine;
pub use evaluator::evaluate;
pub use rule_table::RuleTable;
