//! Key-to-string translation with locale fallback.
//!
//! The base locale (`en`) returns keys verbatim; any other locale looks the
//! key up in the table and falls back to the key itself when no entry
//! exists. The built-in table covers the default `en -> fr` dictionary;
//! callers merge their own entries over it.

use std::collections::HashMap;

/// Locale whose keys are already display strings.
pub const BASE_LOCALE: &str = "en";

#[derive(Debug, Clone)]
pub struct Translator {
    locale: String,
    table: HashMap<String, String>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new("fr")
    }
}

impl Translator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            table: default_table(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    /// Merge custom entries over the defaults.
    pub fn merge(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
        self.table.extend(entries);
    }

    /// Translate a key, returning the key itself for the base locale or
    /// when no entry exists.
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        if self.locale == BASE_LOCALE {
            return key;
        }
        self.table.get(key).map(String::as_str).unwrap_or(key)
    }
}

fn default_table() -> HashMap<String, String> {
    [
        // UI strings
        ("Layers", "Couches"),
        ("Element", "Élément"),
        ("Global data", "Données globales"),
        ("Properties", "Propriétés"),
        ("Basic Information", "Informations de base"),
        ("All Elements Data", "Données de tous les éléments"),
        ("elements", "éléments"),
        ("Reset View", "Vue complète"),
        ("Save as SVG", "Enregistrer en SVG"),
        ("Copy to Clipboard", "Copier dans le presse-papier"),
        ("Copy as Image", "Copier comme image"),
        ("Copy Data", "Copier les données"),
        ("Copy All Data", "Copier toutes les données"),
        ("Data copied to clipboard!", "Données copiées dans le presse-papier !"),
        ("Image copied to clipboard!", "Image copiée dans le presse-papier !"),
        ("SVG copied to clipboard!", "SVG copié dans le presse-papier !"),
        ("Failed to copy to clipboard", "Échec de la copie dans le presse-papier"),
        ("Failed to copy data", "Échec de la copie des données"),
        ("Failed to copy image", "Échec de la copie de l'image"),
        ("No data to copy", "Aucune donnée à copier"),
        ("elements copied to clipboard!", "éléments copiés dans le presse-papier !"),
        // Classes
        ("Building", "Bâtiment"),
        ("BuildingPart", "Partie de bâtiment"),
        ("WallSurface", "Surface de mur"),
        ("RoofSurface", "Surface de toit"),
        ("GroundSurface", "Surface au sol"),
        ("InteriorWallSurface", "Mur intérieur"),
        ("FloorSurface", "Surface de plancher"),
        ("CeilingSurface", "Surface de plafond"),
        ("Window", "Fenêtre"),
        ("Door", "Porte"),
        ("Opening", "Ouverture"),
        ("BuildingInstallation", "Installation technique"),
        ("Pipe", "Conduite"),
        ("Cable", "Câble"),
        ("Road", "Route"),
        ("Bridge", "Pont"),
        ("Tunnel", "Tunnel"),
        ("Parcel", "Parcelle"),
        ("Furniture", "Mobilier"),
        ("Equipment", "Équipement"),
        ("Other", "Autre"),
        ("Unknown", "Inconnu"),
        // Property labels
        ("ID", "ID"),
        ("Reference", "Référence"),
        ("Ref", "Réf"),
        ("Class", "Classe"),
        ("Layer", "Couche"),
        ("Level of detail", "Niveau de détail"),
        ("Material", "Matériau"),
        ("Year Built", "Année de construction"),
        ("Year Restored", "Année de restauration"),
        ("Condition", "État"),
        ("Condition Date", "Date de relevé"),
        ("Height", "Hauteur"),
        ("Thickness", "Épaisseur"),
        ("Ifc Type", "Type IFC"),
        ("Heritage Status", "Statut patrimonial"),
        ("Source", "Source"),
        ("Frame Material", "Matériau du cadre"),
        ("Glass Type", "Type de vitrage"),
        ("Area", "Surface"),
        ("Owner", "Propriétaire"),
        ("Type", "Type"),
        // Conditions
        ("Excellent", "Excellent"),
        ("Good", "Bon"),
        ("Moderate", "Moyen"),
        ("Poor", "Mauvais"),
        ("Ruined", "Ruiné"),
        ("NotApplicable", "Non applicable"),
        // Heritage statuses
        ("None", "Aucun"),
        ("LocalListed", "Inscription locale"),
        ("NationalListed", "Monument historique"),
        ("Protected", "Protégé"),
        ("WorldHeritage", "Patrimoine mondial"),
        // Materials
        ("Stone", "Pierre"),
        ("Brick", "Brique"),
        ("Concrete", "Béton"),
        ("Wood", "Bois"),
        ("Steel", "Acier"),
        ("Glass", "Verre"),
        ("Metal", "Métal"),
        ("Tile", "Tuile"),
        ("Oak", "Chêne"),
        ("PVC", "PVC"),
        ("Single", "Simple"),
        ("Double", "Double"),
        ("Triple", "Triple"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
