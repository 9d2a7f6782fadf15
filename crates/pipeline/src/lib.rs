pub mod bus;
pub mod decode;
pub mod links;
pub mod observe;
pub mod parse;
pub mod publish;
pub mod render;
pub mod run;
