use std::{fmt::Debug, ops::Not};

use thiserror::Error;

use crate::storage::Indexer;

/// A boolean variable of the engine. Variables are created densely, starting at code 0.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Var(u32);

/// The largest code a variable can have. One bit of the code is needed for the polarity of a
/// literal.
pub const MAX_VAR_CODE: u32 = (!0) >> 1;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("the value {0} is larger than the maximum variable code {MAX_VAR_CODE}")]
pub struct VarCodeTooBig(u32);

impl Var {
    #[inline]
    pub fn code(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Var {
    type Error = VarCodeTooBig;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value > MAX_VAR_CODE {
            Err(VarCodeTooBig(value))
        } else {
            Ok(Var(value))
        }
    }
}

impl Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl Indexer for Var {
    fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A literal is a variable together with a polarity. The polarity is stored in the lowest bit,
/// so the two literals of a variable have neighbouring codes.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Lit(u32);

impl Lit {
    #[inline]
    pub fn new(var: Var, is_positive: bool) -> Lit {
        Lit((var.0 << 1) | is_positive as u32)
    }

    #[inline]
    pub fn positive(var: Var) -> Lit {
        Lit::new(var, true)
    }

    #[inline]
    pub fn negative(var: Var) -> Lit {
        Lit::new(var, false)
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 & 1 == 1
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        !self.is_positive()
    }

    #[inline]
    pub fn var(self) -> Var {
        Var(self.0 >> 1)
    }
}

impl Debug for Lit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_positive() {
            write!(f, "{:?}", self.var())
        } else {
            write!(f, "-{:?}", self.var())
        }
    }
}

impl Indexer for Lit {
    fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Self::Output {
        Lit(self.0 ^ 1)
    }
}

/// Build a literal from a DIMACS-like code, for tests: `lit!(3)` is the positive literal of
/// variable 3 and `lit!(-3)` its negation.
#[macro_export]
macro_rules! lit {
    (-$code:literal) => {
        $crate::lit::Lit::negative(
            $crate::lit::Var::try_from($code as u32).expect("variable code in range"),
        )
    };

    ($code:literal) => {
        $crate::lit::Lit::positive(
            $crate::lit::Var::try_from($code as u32).expect("variable code in range"),
        )
    };
}
