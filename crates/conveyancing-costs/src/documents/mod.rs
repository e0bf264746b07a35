//! Quote documents: currency formatting, template rendering, and the stock templates.

pub mod currency;
pub mod defaults;
pub mod renderer;
pub mod sample;

pub use currency::format_rand;
pub use defaults::{email_body, DEFAULT_PDF_TEMPLATE, DEFAULT_SUBJECT_LINE};
pub use renderer::{
    breakdown_html, escape_html, render, RenderContext, Scenario, ScenarioKind, SectionView,
};
pub use sample::sample_scenario;
