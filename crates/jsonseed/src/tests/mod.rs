
mod deserialize;
mod parse;
