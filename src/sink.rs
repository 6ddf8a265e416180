//! Render-side contracts fed by the pollers, the chart synchronizer and the
//! stream client. Sinks receive owned copies; they never see the buffer.

use crate::format::TableRow;
use crate::model::chart_point::ChartPoint;

pub trait TableSink: Send + Sync {
    /// Replaces every row of the table.
    fn replace_rows(&self, rows: Vec<TableRow>);
}

pub trait ChartSink: Send + Sync {
    /// Replaces the whole point set.
    fn set_points(&self, points: Vec<ChartPoint>);

    /// Appends points and drops the oldest ones over the chart's capacity.
    fn append_points(&self, points: Vec<ChartPoint>);

    /// Shows a terminal "unavailable" message in place of the chart.
    fn show_unavailable(&self, message: &str);
}
