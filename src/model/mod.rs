// Host-supplied program structure
//
// The host toolchain parses the program and hands over this immutable
// snapshot; nothing in this crate mutates it.

pub mod program;

pub use program::{
    Arg, BuildMode, Expr, Field, ListenerTypeDecl, ModuleModel, ParamDecl, ProgramModel,
    ResourceDecl, ServiceDecl, TaskDecl, VariableDecl,
};
