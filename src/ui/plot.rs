use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, Points};

use automation_dashboard::data::stats::OccupationStats;

/// One line of a probability chart.
pub struct Series {
    pub name: String,
    pub color: Color32,
    pub years: Vec<i32>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn from_stats(name: String, color: Color32, stats: &OccupationStats) -> Self {
        Series {
            name,
            color,
            years: stats.years.clone(),
            values: stats.probabilities.clone(),
        }
    }

    fn points(&self) -> Vec<[f64; 2]> {
        self.years
            .iter()
            .zip(&self.values)
            .map(|(&x, &y)| [x as f64, y])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Probability over time (lines + markers)
// ---------------------------------------------------------------------------

/// Render automation probability by year for each series.
pub fn probability_plot(ui: &mut Ui, id: &str, series: &[Series]) {
    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Automation probability")
        .include_y(0.0)
        .include_y(1.0)
        .height(420.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for s in series {
                let points = s.points();
                plot_ui.line(
                    Line::new(points.clone())
                        .name(&s.name)
                        .color(s.color)
                        .width(3.0),
                );
                plot_ui.points(
                    Points::new(points)
                        .name(&s.name)
                        .color(s.color)
                        .radius(2.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Country ranking bars
// ---------------------------------------------------------------------------

/// One bar per country, in the given order.
pub fn ranking_chart(ui: &mut Ui, y_label: &str, bars: &[(String, f64, Color32)]) {
    let bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(i, (label, value, color))| {
            Bar::new(i as f64, *value)
                .name(label)
                .fill(*color)
                .width(0.6)
        })
        .collect();

    Plot::new("ranking_chart")
        .legend(Legend::default())
        .y_axis_label(y_label)
        .height(300.0)
        .show_x(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}
