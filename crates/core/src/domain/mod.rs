pub mod classification;
pub mod email;
pub mod interaction;
pub mod knowledge;
pub mod order;
