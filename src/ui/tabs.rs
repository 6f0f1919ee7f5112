use eframe::egui::{self, Color32, RichText, ScrollArea, TextEdit, Ui};
use egui_extras::{Column, TableBuilder};

use automation_dashboard::data::aggregate::{overview_all, rank_countries, RankBy};
use automation_dashboard::data::index::{common_titles, filter_titles, find_row, search_indices};
use automation_dashboard::data::model::RiskTier;
use automation_dashboard::data::stats::{extract, occupation_across, OccupationStats};
use automation_dashboard::data::years::{CURRENT_YEAR, MIDTERM_YEAR};

use crate::color::{country_color, generate_palette, risk_color};
use crate::state::AppState;
use crate::ui::plot::{probability_plot, ranking_chart, Series};

/// Titles shown in the compare picker before the user types a search.
const COMPARE_PREVIEW: usize = 50;
/// Legend labels longer than this are cut with an ellipsis.
const LEGEND_CHARS: usize = 40;

// ---------------------------------------------------------------------------
// Small widgets
// ---------------------------------------------------------------------------

fn tier_text(tier: RiskTier) -> RichText {
    let icon = match tier {
        RiskTier::High => "🔴",
        RiskTier::Medium => "🟡",
        RiskTier::Low => "🟢",
    };
    RichText::new(format!("{icon} {tier}")).color(risk_color(tier))
}

fn metric(ui: &mut Ui, label: &str, value: f64) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(format!("{value:.3}")).size(22.0).strong());
    });
}

fn short_label(title: &str) -> String {
    if title.chars().count() > LEGEND_CHARS {
        let cut: String = title.chars().take(LEGEND_CHARS).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}

fn warn(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(format!("⚠ {text}")).color(Color32::YELLOW));
}

/// Combo box over the loaded countries. Returns the newly picked code.
fn country_picker(ui: &mut Ui, id: &str, state: &AppState, current: Option<&str>) -> Option<String> {
    let countries: Vec<(String, String)> = state
        .loaded_countries()
        .iter()
        .map(|c| (c.code.clone(), c.label()))
        .collect();
    let selected_text = current
        .and_then(|code| countries.iter().find(|(c, _)| c == code))
        .map(|(_, label)| label.clone())
        .unwrap_or_default();

    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            for (code, label) in &countries {
                if ui.selectable_label(current == Some(code.as_str()), label).clicked() {
                    picked = Some(code.clone());
                }
            }
        });
    picked.filter(|code| current != Some(code.as_str()))
}

// ---------------------------------------------------------------------------
// Tab 1 – one occupation across countries
// ---------------------------------------------------------------------------

pub fn compare_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Cross-country occupation analysis");
    ui.add_space(4.0);

    if state.selected_countries.is_empty() {
        warn(ui, "Please select at least one country from the side panel.");
        return;
    }

    let common = common_titles(&state.report.tables, &state.selected_countries);
    if common.is_empty() {
        warn(ui, "No common occupations found across the selected countries.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search for an occupation:");
        ui.add(
            TextEdit::singleline(&mut state.compare_search)
                .hint_text("e.g. 'Software Developer', 'Chief Executive', '11-1011'")
                .desired_width(360.0),
        );
    });

    let filtered: Vec<String> = if state.compare_search.is_empty() {
        ui.label(format!(
            "Showing first {} of {} common occupations",
            COMPARE_PREVIEW.min(common.len()),
            common.len()
        ));
        common.iter().take(COMPARE_PREVIEW).cloned().collect()
    } else {
        let found = filter_titles(&common, &state.compare_search);
        ui.label(format!("Found {} matching occupations", found.len()));
        found
    };
    if filtered.is_empty() {
        return;
    }

    // Keep the picked occupation while it still matches, else take the first.
    if !state.compare_occupation.as_ref().is_some_and(|t| filtered.contains(t)) {
        state.compare_occupation = filtered.first().cloned();
    }

    egui::ComboBox::from_id_salt("compare_occupation")
        .width(420.0)
        .selected_text(state.compare_occupation.clone().unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for title in &filtered {
                ui.selectable_value(&mut state.compare_occupation, Some(title.clone()), title.as_str());
            }
        });

    let Some(title) = state.compare_occupation.clone() else {
        return;
    };

    let stats = occupation_across(&title, &state.report.tables);
    let shown: Vec<_> = state
        .selected_countries
        .iter()
        .filter_map(|code| Some((state.country(code)?, stats.get(code)?)))
        .collect();

    ui.add_space(8.0);
    ui.heading(format!("📊 {title}"));

    ui.columns(shown.len().max(1), |cols: &mut [Ui]| {
        for (col, (country, s)) in cols.iter_mut().zip(&shown) {
            col.group(|ui: &mut Ui| {
                ui.label(RichText::new(country.label()).strong().color(country_color(country)));
                metric(ui, "🎯 Current (2024)", s.current_2024);
                metric(ui, "📅 2030 outlook", s.outlook_2030);
                metric(ui, "🔮 2050 projection", s.midterm_2050);
            });
        }
    });

    let series: Vec<Series> = shown
        .iter()
        .map(|(country, s)| Series::from_stats(country.label(), country_color(country), s))
        .collect();
    ui.add_space(8.0);
    probability_plot(ui, "compare_plot", &series);

    ui.add_space(8.0);
    ui.heading("🎯 Risk assessment by country");
    egui::Grid::new("risk_table")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Country");
            ui.strong(format!("Current risk ({CURRENT_YEAR})"));
            ui.strong("Risk level");
            ui.end_row();
            for (country, s) in &shown {
                ui.label(country.label());
                ui.label(format!("{:.3}", s.current_2024));
                ui.label(tier_text(s.risk()));
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Tab 2 – several occupations within one country
// ---------------------------------------------------------------------------

pub fn multi_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📊 Multi-occupation analysis by country");
    ui.add_space(4.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Country:");
        if let Some(code) = country_picker(ui, "multi_country", state, state.multi_country.as_deref()) {
            state.set_multi_country(code);
        }
    });

    let Some(code) = state.multi_country.clone() else {
        return;
    };
    let Some(table) = state.table(&code).cloned() else {
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search occupations:");
        ui.add(
            TextEdit::singleline(&mut state.multi_search)
                .hint_text("Search to find occupations…")
                .desired_width(300.0),
        );
    });

    let titles: Vec<&str> = table.titles().collect();
    let filtered = filter_titles(&titles, &state.multi_search);
    ui.label(format!(
        "{} occupations match, {} selected",
        filtered.len(),
        state.multi_occupations.len()
    ));

    ScrollArea::vertical()
        .id_salt("multi_list")
        .max_height(180.0)
        .show(ui, |ui: &mut Ui| {
            for title in &filtered {
                let mut checked = state.multi_occupations.contains(title);
                if ui.checkbox(&mut checked, title.as_str()).changed() {
                    state.toggle_multi_occupation(title);
                }
            }
        });

    if state.multi_occupations.is_empty() {
        ui.label("Select occupations to compare.");
        return;
    }

    let picked: Vec<(String, OccupationStats)> = state
        .multi_occupations
        .iter()
        .filter_map(|t| find_row(&table, t).map(|row| (t.clone(), extract(row, &table.years))))
        .collect();

    let palette = generate_palette(picked.len());
    let series: Vec<Series> = picked
        .iter()
        .zip(palette)
        .map(|((title, s), color)| Series::from_stats(short_label(title), color, s))
        .collect();
    ui.add_space(8.0);
    probability_plot(ui, "multi_plot", &series);

    ui.add_space(8.0);
    ui.heading("📋 Occupation comparison table");
    egui::Grid::new("multi_table")
        .striped(true)
        .num_columns(5)
        .show(ui, |ui: &mut Ui| {
            for h in ["Occupation", "Current 2024", "2030 outlook", "2050 projection", "Risk level"] {
                ui.strong(h);
            }
            ui.end_row();
            for (title, s) in &picked {
                ui.label(title.as_str());
                ui.label(format!("{:.4}", s.current_2024));
                ui.label(format!("{:.4}", s.outlook_2030));
                ui.label(format!("{:.4}", s.midterm_2050));
                ui.label(tier_text(s.risk()));
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Tab 3 – browse one country's table
// ---------------------------------------------------------------------------

enum BrowseAction {
    Toggle(String),
    Analyze(String),
}

pub fn browse_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📋 Browse all occupations");
    ui.add_space(4.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Country:");
        if let Some(code) = country_picker(ui, "browse_country", state, state.browse_country.as_deref()) {
            state.browse_country = Some(code);
            state.analyzed = None;
        }
        ui.label("Filter:");
        ui.add(
            TextEdit::singleline(&mut state.browse_filter)
                .hint_text("Type to filter…")
                .desired_width(260.0),
        );
    });

    let Some(code) = state.browse_country.clone() else {
        return;
    };
    let Some(table) = state.table(&code).cloned() else {
        return;
    };
    let color = state.country(&code).map_or(Color32::LIGHT_BLUE, country_color);

    let indices = search_indices(&table, &state.browse_filter);
    if state.browse_filter.is_empty() {
        ui.label(format!("Showing all {} occupations", indices.len()));
    } else {
        ui.label(format!("Showing {} filtered occupations", indices.len()));
    }

    // Detail block for the analyzed occupation.
    if let Some(title) = state.analyzed.clone() {
        if let Some(row) = find_row(&table, &title) {
            let s = extract(row, &table.years);
            ui.group(|ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    ui.heading(format!("🔍 {title}"));
                    if ui.small_button("✖ Close").clicked() {
                        state.analyzed = None;
                    }
                });
                ui.label(format!("SOC code: {}", row.soc_code));
                ui.horizontal(|ui: &mut Ui| {
                    metric(ui, "Current (2024)", s.current_2024);
                    metric(ui, "2030 outlook", s.outlook_2030);
                    metric(ui, "2050 projection", s.midterm_2050);
                    let last = s.final_year.map_or_else(|| "Final".to_string(), |y| y.to_string());
                    metric(ui, &last, s.final_value);
                });
                ui.label(tier_text(s.risk()));
                probability_plot(ui, "browse_plot", &[Series::from_stats(short_label(&title), color, &s)]);
            });
        }
    }

    let current_col = table.years.offset_of(CURRENT_YEAR);
    let midterm_col = table.years.offset_of(MIDTERM_YEAR);
    let mut action = None;

    ui.push_id("browse_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .column(Column::auto().at_least(70.0))
            .column(Column::initial(320.0).at_least(120.0).clip(true))
            .column(Column::auto().at_least(60.0))
            .column(Column::auto().at_least(60.0))
            .column(Column::auto().at_least(90.0))
            .column(Column::remainder())
            .header(22.0, |mut header| {
                for h in ["SOC code", "Title", "2024", "2050", "Risk level", ""] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|body| {
                body.rows(24.0, indices.len(), |mut row| {
                    let occ = &table.rows[indices[row.index()]];
                    let now = current_col.map_or(0.0, |c| occ.prob(c));
                    let later = midterm_col.map_or(0.0, |c| occ.prob(c));
                    let selected = state.selected_occupations.contains(&occ.title);

                    row.col(|ui: &mut Ui| {
                        ui.monospace(&occ.soc_code);
                    });
                    row.col(|ui: &mut Ui| {
                        let text = RichText::new(&occ.title);
                        ui.label(if selected { text.strong() } else { text });
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{now:.4}"));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{later:.4}"));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(tier_text(RiskTier::classify(now)));
                    });
                    row.col(|ui: &mut Ui| {
                        let label = if selected { "Remove" } else { "Add" };
                        if ui.small_button(label).clicked() {
                            action = Some(BrowseAction::Toggle(occ.title.clone()));
                        }
                        if ui.small_button("📊 Analyze").clicked() {
                            action = Some(BrowseAction::Analyze(occ.title.clone()));
                        }
                    });
                });
            });
    });

    match action {
        Some(BrowseAction::Toggle(title)) => state.toggle_occupation(&title),
        Some(BrowseAction::Analyze(title)) => state.analyzed = Some(title),
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Tab 4 – country rankings
// ---------------------------------------------------------------------------

pub fn rankings_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📈 Country rankings");
    ui.add_space(4.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Rank by:");
        for by in [RankBy::Avg2024, RankBy::HighRiskShare] {
            ui.selectable_value(&mut state.rank_by, by, by.label());
        }
    });

    let ranked = rank_countries(overview_all(&state.report.tables), state.rank_by);

    egui::Grid::new("rankings_table")
        .striped(true)
        .num_columns(6)
        .show(ui, |ui: &mut Ui| {
            for h in ["#", "Country", "Occupations", "Avg 2024", "High risk 2050", "Share"] {
                ui.strong(h);
            }
            ui.end_row();
            for (i, (code, o)) in ranked.iter().enumerate() {
                ui.label(format!("{}", i + 1));
                match state.country(code) {
                    Some(c) => ui.label(RichText::new(c.label()).color(country_color(c))),
                    None => ui.label(code.as_str()),
                };
                ui.label(o.total_occupations.to_string());
                ui.label(format!("{:.4}", o.avg_2024));
                ui.label(o.high_risk_2050.to_string());
                ui.label(format!("{:.1}%", o.high_risk_pct));
                ui.end_row();
            }
        });

    let bars: Vec<(String, f64, Color32)> = ranked
        .iter()
        .map(|(code, o)| {
            let value = match state.rank_by {
                RankBy::Avg2024 => o.avg_2024,
                RankBy::HighRiskShare => o.high_risk_pct,
            };
            match state.country(code) {
                Some(c) => (c.label(), value, country_color(c)),
                None => (code.clone(), value, Color32::GRAY),
            }
        })
        .collect();

    ui.add_space(8.0);
    ranking_chart(ui, state.rank_by.label(), &bars);
}
