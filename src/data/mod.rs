/// Data layer: records, loading, aggregation and selection resolution.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → validated records (+ skipped rows)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ DashboardContext  │  records, temperature tables, ranking, hierarchy
///   └──────────────────┘
///        │   Selection (region, country)
///        ▼
///   ┌──────────┐
///   │  charts   │  LineChart / RankingChart / HierarchyChart
///   └──────────┘
/// ```

pub mod aggregate;
pub mod chart;
pub mod context;
pub mod loader;
pub mod model;
pub mod selection;
