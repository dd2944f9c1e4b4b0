// ============================================================================
// Filtre de recherche
// ============================================================================
// Recherche par sous-chaîne du nom, insensible à la casse
//
// Pas de trim : une requête " " ne garde que les noms contenant un espace.
// Requête vide : tous les coins passent, dans le même ordre.
// ============================================================================

use crate::models::Coin;

/// Filtre les coins dont le nom contient la requête (insensible à la casse)
///
/// CONCEPT RUST : Iterator chaining
/// - .filter() garde l'ordre relatif d'origine
/// - .cloned() : on retourne des Coin possédés, la liste source reste intacte
pub fn filter_coins(coins: &[Coin], query: &str) -> Vec<Coin> {
    if query.is_empty() {
        return coins.to_vec();
    }

    let lower_query = query.to_lowercase();
    coins
        .iter()
        .filter(|coin| coin.name.to_lowercase().contains(&lower_query))
        .cloned()
        .collect()
}
