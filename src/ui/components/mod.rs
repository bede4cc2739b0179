pub mod input_bar;
pub mod transcript;
