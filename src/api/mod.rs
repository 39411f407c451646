pub mod kiwi;
pub mod mock;
pub mod notify;
pub mod source;
