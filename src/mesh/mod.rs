//! Triangle mesh, structured generators, and conforming bisection refinement
//!
//! The adaptive loop treats the mesh as the single shared mutable resource:
//! it is mutated only through [`bisect`], and every derived array becomes
//! invalid when that happens.

mod generators;
mod refinement;
mod types;

pub use generators::*;
pub use refinement::*;
pub use types::*;
