//! Calculation tree storage, per formula source.
pub mod formula;

pub use formula::{
    CalcSource, CalculationRelation, CalculationTree, FormulaComparison, FormulaRegistry,
    RegistrySummary,
};
