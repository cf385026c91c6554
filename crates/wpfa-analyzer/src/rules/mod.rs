//! The rule catalogue.
//!
//! Each rule is stateless and registered against the syntax kinds it inspects.
//! `check` sees one node and yields at most one diagnostic; inapplicable nodes
//! yield `Ok(None)` and cancellation unwinds with `Err(Cancelled)`.

pub mod field_order;
pub mod missing_property;
pub mod property_notifies;
pub mod registered_type;

use crate::context::AnalysisContext;
use wpfa_common::{Cancelled, Diagnostic};
use wpfa_syntax::{NodeIndex, SyntaxKind};

pub use field_order::FieldOrder;
pub use missing_property::MissingProperty;
pub use property_notifies::PropertyNotifies;
pub use registered_type::RegisteredType;

pub trait Rule: Send + Sync {
    /// Short kebab-case name used in logs.
    fn name(&self) -> &'static str;

    /// Diagnostic codes this rule can emit.
    fn codes(&self) -> &'static [&'static str];

    /// Node kinds the rule is invoked for.
    fn triggers(&self) -> &'static [SyntaxKind];

    fn check(
        &self,
        ctx: &AnalysisContext<'_>,
        node: NodeIndex,
    ) -> Result<Option<Diagnostic>, Cancelled>;
}

pub type RuleBox = Box<dyn Rule>;

/// Every built-in rule, in code order.
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(RegisteredType),
        Box::new(FieldOrder),
        Box::new(PropertyNotifies),
        Box::new(MissingProperty),
    ]
}
