/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    /// Keep everything inside either operand.
    Union,
    /// Keep what is inside the first operand and outside the second.
    Subtract,
    /// Keep what is inside both operands.
    Intersect,
}

impl BooleanOp {
    /// Lower-case label used in logs and error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::Subtract => "difference",
            Self::Intersect => "intersection",
        }
    }
}
