#[derive(thiserror::Error, Debug)]
pub enum SplineError {
    /// An axis needs at least two knots to form a cell.
    #[error("too few knots on the {axis} axis: {len}")]
    TooFewKnots { axis: char, len: usize },

    /// Knots must be strictly increasing and equidistant.
    #[error("knots on the {axis} axis are not a monotone uniform grid")]
    NonUniformKnots { axis: char },

    /// The value grid contains NaN or infinite entries.
    #[error("value grid contains non-finite entries")]
    NonFiniteValues,

    /// The value grid shape does not match the knot axes.
    #[error("value grid shape {got:?} does not match knot axes {expected:?}")]
    ShapeMismatch { got: Vec<usize>, expected: Vec<usize> },

    /// Evaluation point outside the grid.
    #[error("point {value} outside the {axis} axis range [{lo}, {hi}]")]
    Domain {
        axis: char,
        value: f64,
        lo: f64,
        hi: f64,
    },
}
