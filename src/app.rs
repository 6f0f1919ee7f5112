use eframe::egui::{self, ScrollArea, Ui};

use automation_dashboard::config::DashboardConfig;

use crate::state::{AppState, Tab};
use crate::ui::{panels, tabs};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Build the app and load every configured country from disk.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.load_from_disk();
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // Without any table only the upload prompt is shown.
        if !self.state.has_data() {
            egui::CentralPanel::default().show(ctx, |ui| {
                panels::no_data_prompt(ui, &mut self.state);
            });
            return;
        }

        // ---- Left side panel: countries, export ----
        egui::SidePanel::left("country_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui: &mut Ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.tab, tab, tab.label());
                }
            });
            ui.separator();

            match self.state.tab {
                // The browse table scrolls on its own.
                Tab::Browse => tabs::browse_tab(ui, &mut self.state),
                tab => {
                    ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui: &mut Ui| match tab {
                            Tab::Compare => tabs::compare_tab(ui, &mut self.state),
                            Tab::MultiOccupation => tabs::multi_tab(ui, &mut self.state),
                            _ => tabs::rankings_tab(ui, &mut self.state),
                        });
                }
            }
        });
    }
}
