//! Question answering adapters.

mod stub_answerer;

pub use stub_answerer::StubQuestionAnswerer;
