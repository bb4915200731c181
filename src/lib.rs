//! # Flowplan — workflow definition, validation and optimization
//!
//! `flowplan` is a synchronous, in-process library for declaratively
//! assembling directed graphs of typed execution steps and statically
//! analyzing them.  It does not run anything: timeouts and retry policies
//! are declarative data for an external executor, and validation is a pure
//! function of a config snapshot.
//!
//! - **Step model**: feature invocations plus parallel, sequential and
//!   conditional composition, each with declared dependencies, fallbacks
//!   and timeout/retry overrides.
//! - **Builder**: fluent incremental construction with fail-fast id checks
//!   and forward-referencing dependencies.
//! - **Validation**: a fixed rule pipeline classifying findings as errors,
//!   warnings or optimization suggestions, with three-color DFS cycle
//!   reporting.
//! - **Optimization analysis**: parallelization groups with idealized
//!   speedups, cache candidates and recursive timeout recommendations.
//! - **Templates**: `{{name}}` placeholder extraction and substitution for
//!   turning a concrete graph into a reusable factory.
//!
//! # Quick start
//!
//! ```rust
//! use flowplan::WorkflowBuilder;
//! use std::collections::HashMap;
//!
//! let builder = WorkflowBuilder::new("onboarding", "Onboarding")
//!     .add_feature_step("profile", "Build profile", "profile", "analyze", HashMap::new())
//!     .unwrap()
//!     .add_feature_step("plan", "Generate plan", "workout", "generate_plan", HashMap::new())
//!     .unwrap()
//!     .add_dependency("plan", "profile")
//!     .unwrap();
//!
//! let report = builder.validate();
//! assert!(report.valid);
//!
//! let analyzed = builder.optimize();
//! assert_eq!(analyzed.cache_candidates.len(), 2);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod model;
pub mod optimize;
pub mod template;
pub mod validation;

pub use builder::WorkflowBuilder;
pub use error::{WorkflowError, WorkflowResult};
pub use graph::DependencyGraph;
pub use model::{
    BackoffStrategy, ComparisonOperator, Condition, RetryPolicy, Step, StepKind, WorkflowConfig,
};
pub use optimize::{CacheCandidate, OptimizedWorkflow, ParallelGroup, TimeoutRecommendation};
pub use template::WorkflowTemplate;
pub use validation::{
    validate_config, Category, Impact, OptimizationSuggestion, Severity, ValidationError,
    ValidationResult, ValidationWarning,
};
