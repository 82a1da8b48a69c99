//! Boolean filter expression trees
//!
//! Filters are opaque to lowering — they pass through the SQL AST
//! unchanged and the pretty-printer renders them per dialect. The core
//! does not verify that referenced columns exist in the subquery schema;
//! that surfaces at the driver.

use serde::{Deserialize, Serialize};

use ql_core::Scalar;

/// Boolean connective at a filter node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoolOp {
    And,
    Or,
}

/// Binary relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BinRelOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    Begins,
    Ends,
    Contains,
}

/// Unary relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryRelOp {
    #[serde(rename = "ISNULL")]
    IsNull,
    #[serde(rename = "ISNOTNULL")]
    IsNotNull,
}

/// Operand of a relational expression: a column reference or a constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expType")]
pub enum ValExp {
    ColRef {
        #[serde(rename = "colName")]
        col_name: String,
    },
    ConstVal {
        val: Scalar,
    },
}

/// Reference a column by id
pub fn col(name: impl Into<String>) -> ValExp {
    ValExp::ColRef {
        col_name: name.into(),
    }
}

/// A constant operand
pub fn const_val(val: impl Into<Scalar>) -> ValExp {
    ValExp::ConstVal { val: val.into() }
}

/// A single relational comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expType")]
pub enum RelExp {
    BinRelExp {
        op: BinRelOp,
        lhs: ValExp,
        rhs: ValExp,
    },
    UnaryRelExp {
        op: UnaryRelOp,
        arg: ValExp,
    },
}

/// Argument of a boolean node: a comparison or a nested filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubExp {
    Rel(RelExp),
    Filter(FilterExp),
}

/// A boolean expression tree over columns and constants.
///
/// Built fluently:
///
/// ```
/// use ql_rel::filter::{col, const_val, FilterExp};
///
/// let fexp = FilterExp::and()
///     .eq(col("JobFamily"), const_val("Executive Management"))
///     .gt(col("TCOE"), const_val(200_000));
/// assert_eq!(fexp.op_args.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExp {
    pub op: BoolOp,
    pub op_args: Vec<SubExp>,
}

impl FilterExp {
    /// An empty conjunction
    pub fn and() -> Self {
        Self {
            op: BoolOp::And,
            op_args: Vec::new(),
        }
    }

    /// An empty disjunction
    pub fn or() -> Self {
        Self {
            op: BoolOp::Or,
            op_args: Vec::new(),
        }
    }

    fn bin(mut self, op: BinRelOp, lhs: ValExp, rhs: ValExp) -> Self {
        self.op_args.push(SubExp::Rel(RelExp::BinRelExp { op, lhs, rhs }));
        self
    }

    fn unary(mut self, op: UnaryRelOp, arg: ValExp) -> Self {
        self.op_args.push(SubExp::Rel(RelExp::UnaryRelExp { op, arg }));
        self
    }

    pub fn eq(self, lhs: ValExp, rhs: ValExp) -> Self {
        self.bin(BinRelOp::Eq, lhs, rhs)
    }

    pub fn ne(self, lhs: ValExp, rhs: ValExp) -> Self {
        self.bin(BinRelOp::Ne, lhs, rhs)
    }

    pub fn gt(self, lhs: ValExp, rhs: ValExp) -> Self {
        self.bin(BinRelOp::Gt, lhs, rhs)
    }

    pub fn ge(self, lhs: ValExp, rhs: ValExp) -> Self {
        self.bin(BinRelOp::Ge, lhs, rhs)
    }

    pub fn lt(self, lhs: ValExp, rhs: ValExp) -> Self {
        self.bin(BinRelOp::Lt, lhs, rhs)
    }

    pub fn le(self, lhs: ValExp, rhs: ValExp) -> Self {
        self.bin(BinRelOp::Le, lhs, rhs)
    }

    pub fn like(self, lhs: ValExp, rhs: ValExp) -> Self {
        self.bin(BinRelOp::Like, lhs, rhs)
    }

    pub fn begins(self, lhs: ValExp, rhs: ValExp) -> Self {
        self.bin(BinRelOp::Begins, lhs, rhs)
    }

    pub fn ends(self, lhs: ValExp, rhs: ValExp) -> Self {
        self.bin(BinRelOp::Ends, lhs, rhs)
    }

    pub fn contains(self, lhs: ValExp, rhs: ValExp) -> Self {
        self.bin(BinRelOp::Contains, lhs, rhs)
    }

    pub fn is_null(self, arg: ValExp) -> Self {
        self.unary(UnaryRelOp::IsNull, arg)
    }

    pub fn is_not_null(self, arg: ValExp) -> Self {
        self.unary(UnaryRelOp::IsNotNull, arg)
    }

    /// Nest another filter as a parenthesized subexpression
    pub fn subexp(mut self, fexp: FilterExp) -> Self {
        self.op_args.push(SubExp::Filter(fexp));
        self
    }
}

/// Shorthand for [`FilterExp::and`]
pub fn and() -> FilterExp {
    FilterExp::and()
}

/// Shorthand for [`FilterExp::or`]
pub fn or() -> FilterExp {
    FilterExp::or()
}

// FilterExp carries an `expType: "FilterExp"` discriminator on the wire,
// which serde's internally-tagged representation only supports on enums.
// Serialization round-trips through a single-variant mirror enum.
#[derive(Serialize, Deserialize)]
#[serde(tag = "expType")]
enum FilterExpWire {
    FilterExp {
        op: BoolOp,
        #[serde(rename = "opArgs")]
        op_args: Vec<SubExp>,
    },
}

impl Serialize for FilterExp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FilterExpWire::FilterExp {
            op: self.op,
            op_args: self.op_args.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterExp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let FilterExpWire::FilterExp { op, op_args } = FilterExpWire::deserialize(deserializer)?;
        Ok(FilterExp { op, op_args })
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
