// ============================================================================
// Paginator
// ============================================================================
// Fenêtre de pagination sur une collection ordonnée
//
// Règles :
// - next() avance d'une page seulement s'il reste des éléments après
// - prev() recule seulement si l'index reste >= 0
// - Aucun clamp automatique quand la collection rétrécit : si start_index
//   dépasse la taille, la page visible est vide jusqu'à reset() ou prev()
// ============================================================================

use std::ops::Range;

/// État de pagination : taille totale, taille de page, index de départ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total_items: usize,
    items_per_page: usize,
    start_index: usize,
}

impl Paginator {
    /// Crée un paginator vide
    ///
    /// Une taille de page de 0 est ramenée à 1.
    pub fn new(items_per_page: usize) -> Self {
        Self {
            total_items: 0,
            items_per_page: items_per_page.max(1),
            start_index: 0,
        }
    }

    /// Crée un paginator pour une collection de taille connue
    pub fn with_total(items_per_page: usize, total_items: usize) -> Self {
        let mut paginator = Self::new(items_per_page);
        paginator.total_items = total_items;
        paginator
    }

    /// Met à jour la taille de la collection, sans toucher à start_index
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Page suivante (no-op sur la dernière page)
    pub fn next(&mut self) {
        if self.has_next() {
            self.start_index += self.items_per_page;
        }
    }

    /// Page précédente (no-op sur la première page)
    ///
    /// CONCEPT RUST : checked_sub
    /// - None si le résultat serait négatif (usize)
    pub fn prev(&mut self) {
        if let Some(index) = self.start_index.checked_sub(self.items_per_page) {
            self.start_index = index;
        }
    }

    /// Retour à la première page
    pub fn reset(&mut self) {
        self.start_index = 0;
    }

    pub fn has_next(&self) -> bool {
        self.start_index + self.items_per_page < self.total_items
    }

    pub fn has_prev(&self) -> bool {
        self.start_index > 0
    }

    /// Intervalle visible, borné à [0, total_items)
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.start_index.min(self.total_items);
        let end = (self.start_index + self.items_per_page).min(self.total_items);
        start..end
    }

    /// Tranche visible d'une collection
    ///
    /// Borne aussi par la longueur réelle de `items`, au cas où total_items
    /// n'aurait pas encore été mis à jour.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.visible_range();
        let start = range.start.min(items.len());
        let end = range.end.min(items.len());
        &items[start..end]
    }

    /// Nombre de pages : ceil(total / taille de page)
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.items_per_page)
    }

    /// Page courante, 1-indexée, 0 si la collection est vide
    pub fn current_page(&self) -> usize {
        if self.total_pages() > 0 {
            self.start_index / self.items_per_page + 1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_prev_ten_by_five() {
        let mut pager = Paginator::with_total(5, 10);
        assert_eq!(pager.start_index(), 0);

        pager.next();
        assert_eq!(pager.start_index(), 5);

        // Dernière page : no-op
        pager.next();
        assert_eq!(pager.start_index(), 5);

        pager.prev();
        assert_eq!(pager.start_index(), 0);

        // Première page : no-op
        pager.prev();
        assert_eq!(pager.start_index(), 0);
    }

    #[test]
    fn test_empty_collection() {
        let mut pager = Paginator::with_total(5, 0);
        assert_eq!(pager.total_pages(), 0);
        assert_eq!(pager.current_page(), 0);
        assert_eq!(pager.visible_range(), 0..0);

        pager.next();
        pager.prev();
        assert_eq!(pager.start_index(), 0);
    }

    #[test]
    fn test_pages_and_tail() {
        let mut pager = Paginator::with_total(4, 10);
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(pager.current_page(), 1);

        pager.next();
        pager.next();
        assert_eq!(pager.current_page(), 3);
        assert_eq!(pager.visible_range(), 8..10);
        assert!(!pager.has_next());
        assert!(pager.has_prev());

        let items: Vec<u32> = (0..10).collect();
        assert_eq!(pager.slice(&items), &[8, 9]);
    }

    #[test]
    fn test_shrink_does_not_clamp() {
        let mut pager = Paginator::with_total(3, 6);
        pager.next();
        assert_eq!(pager.start_index(), 3);

        // La collection passe de 6 à 2 éléments : page vide
        pager.set_total_items(2);
        assert_eq!(pager.start_index(), 3);
        assert!(pager.visible_range().is_empty());
        assert_eq!(pager.slice(&["a", "b"]), &[] as &[&str]);

        // prev() ramène sur des éléments visibles
        pager.prev();
        assert_eq!(pager.slice(&["a", "b"]), &["a", "b"]);
    }

    #[test]
    fn test_reset_and_zero_page_size() {
        let mut pager = Paginator::with_total(0, 3);
        assert_eq!(pager.items_per_page(), 1);

        pager.next();
        pager.next();
        assert_eq!(pager.start_index(), 2);

        pager.reset();
        assert_eq!(pager.start_index(), 0);
    }

    #[test]
    fn test_slice_guards_stale_total() {
        let pager = Paginator::with_total(5, 10);
        let items = [1, 2, 3];
        assert_eq!(pager.slice(&items), &[1, 2, 3]);
    }
}
