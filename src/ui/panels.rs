use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use automation_dashboard::export::ExportFormat;

use crate::color::country_color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – country selection and export
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🌍 Countries");
    ui.separator();

    if !state.has_data() {
        ui.label("No data loaded.");
        return;
    }

    let countries: Vec<(String, String, String, Color32)> = state
        .loaded_countries()
        .iter()
        .map(|c| (c.code.clone(), c.label(), c.description.clone(), country_color(c)))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Select countries for analysis");
            for (code, label, description, color) in &countries {
                let mut checked = state.is_country_selected(code);
                let text = RichText::new(label).color(*color);
                if ui.checkbox(&mut checked, text).on_hover_text(description).changed() {
                    state.toggle_country(code);
                }
            }
            ui.separator();

            ui.strong("📥 Export data");
            for (code, label, _, _) in &countries {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(label);
                    for format in [ExportFormat::Csv, ExportFormat::Excel] {
                        if ui.small_button(format.to_string()).clicked() {
                            save_export(state, code, format);
                        }
                    }
                });
            }
            ui.separator();

            let n = state.selected_occupations.len();
            egui::CollapsingHeader::new(RichText::new(format!("⭐ Selected occupations ({n})")).strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    let mut remove = None;
                    for title in &state.selected_occupations {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("✖").clicked() {
                                remove = Some(title.clone());
                            }
                            ui.label(title);
                        });
                    }
                    if let Some(title) = remove {
                        state.toggle_occupation(&title);
                    }
                    if n > 0 && ui.small_button("Clear").clicked() {
                        state.selected_occupations.clear();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Upload files…").clicked() {
                upload_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.load_from_disk();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} of {} countries loaded",
            state.report.tables.len(),
            state.config.countries.len()
        ));

        if !state.report.missing.is_empty() {
            ui.separator();
            ui.label(RichText::new(format!("⚠ Missing: {}", state.report.missing.join(", "))).color(Color32::YELLOW));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") || msg.starts_with("Could not") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Empty state
// ---------------------------------------------------------------------------

/// Shown instead of the tabs while no country has data.
pub fn no_data_prompt(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(80.0);
        ui.heading("🌍 Country-Specific Automation Probability Dashboard");
        ui.add_space(12.0);
        ui.label(format!(
            "No country data found in {}.",
            state.config.data_dir.display()
        ));
        ui.label("Upload the corrected probability files, named as below, or choose the folder that holds them.");
        ui.add_space(8.0);
        for country in &state.config.countries {
            ui.monospace(format!("{}  {}", country.flag, country.file));
        }
        ui.add_space(12.0);
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("📂 Open data folder…").clicked() {
                open_folder_dialog(state);
            }
            if ui.button("⬆ Upload files…").clicked() {
                upload_dialog(state);
            }
        });
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    if let Some(dir) = rfd::FileDialog::new()
        .set_title("Choose the folder with the country files")
        .set_directory(&state.config.data_dir)
        .pick_folder()
    {
        state.set_data_dir(dir);
    }
}

pub fn upload_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Upload country data files")
        .add_filter("Supported files", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "parquet"])
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet"])
        .pick_files();

    if let Some(paths) = files {
        state.ingest_upload_paths(&paths);
    }
}

fn save_export(state: &mut AppState, code: &str, format: ExportFormat) {
    let payload = match state.export_country(code, format) {
        Ok(p) => p,
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
            return;
        }
    };

    let Some(path) = rfd::FileDialog::new()
        .set_title("Save export")
        .set_file_name(&payload.filename)
        .add_filter(format.to_string(), &[format.extension()])
        .save_file()
    else {
        return;
    };

    match std::fs::write(&path, &payload.bytes) {
        Ok(()) => {
            log::info!("Exported {} ({} bytes, {})", path.display(), payload.bytes.len(), payload.mime);
            state.status_message = Some(format!("Saved {}", path.display()));
        }
        Err(e) => {
            log::error!("Writing {} failed: {e}", path.display());
            state.status_message = Some(format!("Error: writing {}: {e}", path.display()));
        }
    }
}
