/// Upstream data sources.
///
/// - `umm`: Nord Pool UMM API client and response conversion.

pub mod umm;
