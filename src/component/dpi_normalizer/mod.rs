//! DPI 正規化元件
//!
//! 將影像宣告的解析度統一改為目標 DPI（預設 72），不重新編碼像素

mod main;
mod normalizer;

pub use main::DpiNormalization;
pub use normalizer::{DpiNormalizer, DpiOutcome, NormalizeResult};
