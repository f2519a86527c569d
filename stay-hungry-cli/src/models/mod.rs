pub mod lenient;
pub mod report;
pub mod routine;
pub mod user;

pub use report::{
    AdherenceReport, AnalyticsData, AnalyticsKpis, BmiPoint, CaloriesRow, ChurnRow, PrRow,
    ProgressData, ProgressKpis, TrainerClientsReport, UsageSummary, VolumeRow, WeightPoint,
};
pub use routine::{
    ClientSummary, Exercise, NewSet, SessionItem, SetRow, TemplateItem, TodaySession,
    TodaySummaryRow,
};
pub use user::{active_count, bmi, BmiCategory, Rol, StatusFilter, UserFilter, UserProfile};
