//! Agentry Tools: collaborators invoked by the workflow stages
//!
//! Every tool here is an explicitly constructed dependency handed to a
//! stage, never a shared global. Stand-in analyzers use keyword matching;
//! the traits (`Retriever`, `Generator`) are the seams where production
//! backends plug in.

pub mod citation;
pub mod compliance;
pub mod drafting;
pub mod evaluation;
pub mod generate;
pub mod research;
pub mod retrieval;
pub mod risk;

pub use citation::{CitationEngine, CITATIONS_HEADER};
pub use compliance::{ComplianceChecker, ComplianceReport};
pub use drafting::{DraftError, Drafter};
pub use evaluation::{Evaluator, ScoreWeights};
pub use generate::{CannedGenerator, GenerationError, Generator};
pub use research::{CaseFinding, ResearchContext, Researcher, StatuteFinding};
pub use retrieval::{MemoryStore, Passage, RetrievalError, Retriever};
pub use risk::{RiskLevel, RiskReport, RiskScanner};
