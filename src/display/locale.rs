// src/display/locale.rs
use clap::ValueEnum;

/// Display language for the grid and the menu. The data itself is locale-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Locale {
    #[default]
    De,
    En,
}

/// Fixed user-facing strings for one locale.
pub struct Strings {
    pub title: &'static str,
    pub yes: &'static str,
    pub no: &'static str,
    pub no_data: &'static str,
    pub loaded: &'static str,
    pub menu_title: &'static str,
    pub menu_filter: &'static str,
    pub menu_sort: &'static str,
    pub menu_display: &'static str,
    pub menu_reset: &'static str,
    pub menu_exit: &'static str,
    pub choose_option: &'static str,
    pub choose_column: &'static str,
    pub choose_operator: &'static str,
    pub enter_value: &'static str,
    pub value_range: &'static str,
    pub enter_min: &'static str,
    pub enter_max: &'static str,
    pub choose_values: &'static str,
    pub sort_order: &'static str,
    pub reset_done: &'static str,
    pub invalid_input: &'static str,
    pub goodbye: &'static str,
    pub average: &'static str,
}

static DE: Strings = Strings {
    title: "E-Scooter Daten-Analysator",
    yes: "Ja",
    no: "Nein",
    no_data: "Keine Daten vorhanden. Eventuell sind die Filter zu streng.",
    loaded: "E-Scooter geladen",
    menu_title: "E-Scooter Menü",
    menu_filter: "Daten filtern",
    menu_sort: "Daten sortieren",
    menu_display: "Aktuelle Liste anzeigen",
    menu_reset: "Auf vollständige Liste zurücksetzen",
    menu_exit: "Beenden",
    choose_option: "Option wählen",
    choose_column: "Nummer der Spalte eingeben",
    choose_operator: "Operator eingeben (<, <=, >, >=, ==, range)",
    enter_value: "Wert eingeben",
    value_range: "Wertebereich",
    enter_min: "Minimum eingeben",
    enter_max: "Maximum eingeben",
    choose_values: "Nummern der gewünschten Werte eingeben (z.B. '0, 2')",
    sort_order: "Sortierreihenfolge (asc/desc)",
    reset_done: "Filter und Sortierung wurden zurückgesetzt.",
    invalid_input: "Ungültige Eingabe.",
    goodbye: "Auf Wiedersehen!",
    average: "Durchschnitt",
};

static EN: Strings = Strings {
    title: "E-Scooter Data Analyzer",
    yes: "Yes",
    no: "No",
    no_data: "No data to display. Your filters might be too restrictive.",
    loaded: "e-scooters loaded",
    menu_title: "E-Scooter Analyzer Menu",
    menu_filter: "Filter data",
    menu_sort: "Sort data",
    menu_display: "Display current list",
    menu_reset: "Reset to full list",
    menu_exit: "Exit",
    choose_option: "Choose an option",
    choose_column: "Enter the number of the column",
    choose_operator: "Enter operator (<, <=, >, >=, ==, range)",
    enter_value: "Enter value",
    value_range: "Value range",
    enter_min: "Enter minimum",
    enter_max: "Enter maximum",
    choose_values: "Enter the numbers of the options to include (e.g. '0, 2')",
    sort_order: "Sort order (asc/desc)",
    reset_done: "Filters and sorting have been reset.",
    invalid_input: "Invalid input.",
    goodbye: "Goodbye!",
    average: "Average",
};

// (column name, German label, English label)
const COLUMN_LABELS: &[(&str, &str, &str)] = &[
    ("model", "Modell", "Model"),
    ("gewicht_kg", "Gewicht (kg)", "Weight (kg)"),
    ("reichweite_km_offiziell", "Reichweite (km)", "Range (km)"),
    ("akku_wh", "Akku (Wh)", "Battery (Wh)"),
    ("motor_w", "Motor (W)", "Motor (W)"),
    ("federung", "Federung", "Suspension"),
    ("blinker", "Blinker", "Blinkers"),
    ("bremslicht", "Bremslicht", "Brake Light"),
    ("wechselakku", "Wechselakku", "Swappable Battery"),
    ("zuladung_bis_kg", "Zuladung (kg)", "Max. Load (kg)"),
    ("uvp", "Preis (€)", "Price (€)"),
];

impl Locale {
    pub fn strings(self) -> &'static Strings {
        match self {
            Locale::De => &DE,
            Locale::En => &EN,
        }
    }

    /// Display label for a normalized column name; unknown columns keep their name.
    pub fn column_label<'a>(self, column: &'a str) -> &'a str {
        COLUMN_LABELS
            .iter()
            .find(|(name, _, _)| *name == column)
            .map(|&(_, de, en)| match self {
                Locale::De => de,
                Locale::En => en,
            })
            .unwrap_or(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_labels() {
        assert_eq!(Locale::De.column_label("gewicht_kg"), "Gewicht (kg)");
        assert_eq!(Locale::En.column_label("wechselakku"), "Swappable Battery");
        assert_eq!(Locale::En.column_label("toleranz_optimiert"), "toleranz_optimiert");
    }

    #[test]
    fn test_default_locale_is_german() {
        assert_eq!(Locale::default(), Locale::De);
        assert_eq!(Locale::default().strings().yes, "Ja");
    }
}
