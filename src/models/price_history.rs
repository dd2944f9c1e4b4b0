// ============================================================================
// Historique de prix synthétique
// ============================================================================
// Génère une série de prix "plausible" pour les line charts, sans aucune
// donnée historique réelle
//
// ALGORITHME :
// - seed = somme des codes de caractères de l'id du coin
// - Pour chaque jour i (de `days` à 0) : pseudo-aléatoire via sin(seed + i*137)
// - Marche aléatoire de volatilité 2% autour du prix précédent
// - Le dernier point (aujourd'hui) vaut exactement le prix actuel
//
// Déterministe : même (prix, id, days) le même jour => même série.
// L'UI peut donc régénérer la série à chaque rendu sans scintillement.
// ============================================================================

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;

/// Fenêtre par défaut de l'historique (en jours)
pub const DEFAULT_HISTORY_DAYS: u32 = 14;

/// Volatilité journalière de la marche aléatoire
const VOLATILITY: f64 = 0.02;

/// Pas du seed entre deux jours consécutifs
const DAY_SEED_STEP: f64 = 137.0;

/// Un point de l'historique : date calendaire + prix
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceHistoryPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Génère l'historique synthétique d'un coin en partant d'aujourd'hui
///
/// Retourne `days + 1` points, du plus ancien au plus récent.
pub fn generate_price_history(base_price: f64, seed_key: &str, days: u32) -> Vec<PriceHistoryPoint> {
    generate_price_history_at(base_price, seed_key, days, Local::now().date_naive())
}

/// Même chose avec une date de référence explicite
///
/// CONCEPT : Fonction pure
/// - Aucune lecture d'horloge : testable et reproductible
pub fn generate_price_history_at(
    base_price: f64,
    seed_key: &str,
    days: u32,
    today: NaiveDate,
) -> Vec<PriceHistoryPoint> {
    let seed = seed_from_key(seed_key);

    let mut history = Vec::with_capacity(days as usize + 1);
    let mut previous_price = base_price;

    // CONCEPT RUST : Range inversé
    // - (0..=days).rev() : days, days-1, ..., 0
    for i in (0..=days).rev() {
        let date = today - Duration::days(i as i64);

        let price_change = previous_price * day_noise(seed, i) * VOLATILITY;

        // Le dernier jour est forcé au prix actuel, quelle que soit la dérive
        let price = if i == 0 {
            base_price
        } else {
            let price = previous_price + price_change;
            previous_price = price;
            price
        };

        history.push(PriceHistoryPoint { date, price });
    }

    history
}

/// Somme des codes de caractères de la clé
///
/// Un caractère hors BMP ne compte que pour sa première unité UTF-16.
fn seed_from_key(seed_key: &str) -> u64 {
    seed_key
        .chars()
        .map(|c| u64::from(c.encode_utf16(&mut [0u16; 2])[0]))
        .sum()
}

/// Bruit déterministe dans [-1, 1) pour le jour `i`
fn day_noise(seed: u64, i: u32) -> f64 {
    let day_seed = seed as f64 + i as f64 * DAY_SEED_STEP;
    let pseudo_random = day_seed.sin() * 10000.0;
    (pseudo_random - pseudo_random.floor()) * 2.0 - 1.0
}
