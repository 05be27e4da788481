pub mod etf;
pub mod recommendation;
