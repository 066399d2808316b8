//! Output files written alongside the database.
//!
//! - [`json`]: the Q&A pairs retained by a `faq` run
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 091502.json
//!     └── 174230.json
//! ```

pub mod json;
