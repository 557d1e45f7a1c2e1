//! Symbol binding and type checking: surface AST in, typed AST out.

pub mod binder;
pub mod symbols;
pub mod typed;

pub use binder::bind_program;
pub use symbols::{FuncSig, FuncTable, ScopeId, Symbol, SymbolId, SymbolKind, SymbolTable, Ty};
