//! # ActiveListManager
//!
//! Holds one [`SimpleActiveList`] slot per state-class index, in the fixed
//! order the linguist declares. Slots are created lazily, so a stratum that
//! never receives a token simply never allocates one.

use crate::active_list::{ActiveList, SimpleActiveList};
use crate::errors::{WordtrellisError, WtResult};
use crate::token::TokenId;
use crate::types::{FastHashMap, StateClassId};

/// Routes tokens into per-state-class [`SimpleActiveList`] slots and
/// exposes the emitting stratum and non-emitting strata in state-class
/// order.
#[derive(Debug, Default)]
pub struct ActiveListManager {
    slots: FastHashMap<StateClassId, SimpleActiveList>,
    /// The class the linguist marks as emitting. Exactly one class is
    /// emitting: everything at or after this point in `state_order` is
    /// emitting, non-emitting classes come strictly before it.
    emitting_class: Option<StateClassId>,
    state_order: Vec<StateClassId>,
}

impl ActiveListManager {
    /// Build a manager for the given state-class order, designating
    /// `emitting_class` as the single emitting class.
    pub fn new(
        state_order: Vec<StateClassId>,
        emitting_class: StateClassId,
    ) -> Self {
        Self {
            slots: FastHashMap::default(),
            emitting_class: Some(emitting_class),
            state_order,
        }
    }

    /// Route `token_class`'s token into its slot, creating the slot
    /// lazily.
    ///
    /// ## Errors
    /// [`WordtrellisError::UnknownStateClass`] if `token_class` is not in
    /// this manager's declared state order.
    pub fn add(
        &mut self,
        token_class: StateClassId,
        id: TokenId,
    ) -> WtResult<()> {
        self.require_known_class(token_class)?;
        self.slots.entry(token_class).or_default().add(id);
        Ok(())
    }

    /// Remove `old` from `token_class`'s slot and insert `new` in its
    /// place.
    pub fn replace(
        &mut self,
        token_class: StateClassId,
        old: TokenId,
        new: TokenId,
    ) -> WtResult<()> {
        self.require_known_class(token_class)?;
        let slot = self.slots.entry(token_class).or_default();
        slot.remove(old);
        slot.add(new);
        Ok(())
    }

    /// Take and clear the (single) emitting slot.
    pub fn emitting_list(&mut self) -> SimpleActiveList {
        match self.emitting_class {
            Some(class) => self.take_slot(class),
            None => SimpleActiveList::new(),
        }
    }

    /// Take and clear an arbitrary class's slot, whether emitting or not.
    ///
    /// Used to pull the seed active list back out immediately after
    /// placing the initial token, regardless of which class that token's
    /// state happens to belong to.
    pub fn take_class(
        &mut self,
        class: StateClassId,
    ) -> SimpleActiveList {
        self.take_slot(class)
    }

    fn take_slot(
        &mut self,
        class: StateClassId,
    ) -> SimpleActiveList {
        self.slots.remove(&class).unwrap_or_default()
    }

    /// A non-destructive copy of the current emitting slot's contents,
    /// without removing it from the manager.
    pub fn peek_emitting(&self) -> SimpleActiveList {
        match self.emitting_class {
            Some(class) => self.slots.get(&class).cloned().unwrap_or_default(),
            None => SimpleActiveList::new(),
        }
    }

    /// Replace the emitting slot's contents wholesale (used after pruning,
    /// and to seed the very first stratum at `start()`).
    pub fn set_emitting_list(
        &mut self,
        list: SimpleActiveList,
    ) {
        if let Some(class) = self.emitting_class {
            self.slots.insert(class, list);
        }
    }

    /// Take the next non-empty non-emitting stratum, in state-class order,
    /// removing it from the manager. Returns `None` once all non-emitting
    /// strata are empty (ε-closure complete).
    pub fn take_next_non_emitting(&mut self) -> Option<(StateClassId, SimpleActiveList)> {
        for &class in &self.state_order {
            if Some(class) == self.emitting_class {
                continue;
            }
            if let Some(list) = self.slots.get(&class) {
                if list.size() > 0 {
                    let list = self.slots.remove(&class).unwrap();
                    return Some((class, list));
                }
            }
        }
        None
    }

    /// Current size of every non-empty slot, for `show_token_count`
    /// diagnostics.
    pub fn slot_sizes(&self) -> Vec<(StateClassId, usize)> {
        self.state_order
            .iter()
            .filter_map(|&class| self.slots.get(&class).map(|l| (class, l.size())))
            .collect()
    }

    fn require_known_class(
        &self,
        class: StateClassId,
    ) -> WtResult<()> {
        if self.state_order.contains(&class) {
            Ok(())
        } else {
            Err(WordtrellisError::UnknownStateClass { class })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linguist::SearchStateHandle;
    use crate::token::{Token, TokenArena};

    fn push(
        arena: &mut TokenArena,
        score: f32,
    ) -> TokenId {
        arena.alloc(Token {
            search_state: SearchStateHandle(0),
            frame: 0,
            score,
            acoustic_score: 0.0,
            language_score: 0.0,
            insertion_score: 0.0,
            predecessor: None,
            working_score: 0.0,
            emitting: false,
            word: false,
            final_state: false,
        })
    }

    #[test]
    fn test_add_and_take_non_emitting() {
        let non_emit = StateClassId(0);
        let emit = StateClassId(1);
        let mut manager = ActiveListManager::new(vec![non_emit, emit], emit);
        let mut arena = TokenArena::new();

        let id = push(&mut arena, -1.0);
        manager.add(non_emit, id).unwrap();

        let (class, list) = manager.take_next_non_emitting().unwrap();
        assert_eq!(class, non_emit);
        assert_eq!(list.size(), 1);
        assert!(manager.take_next_non_emitting().is_none());
    }

    #[test]
    fn test_unknown_class_is_rejected() {
        let emit = StateClassId(1);
        let mut manager = ActiveListManager::new(vec![emit], emit);
        let mut arena = TokenArena::new();
        let id = push(&mut arena, -1.0);
        assert!(manager.add(StateClassId(9), id).is_err());
    }

    #[test]
    fn test_replace() {
        let emit = StateClassId(1);
        let mut manager = ActiveListManager::new(vec![emit], emit);
        let mut arena = TokenArena::new();
        let a = push(&mut arena, -1.0);
        let b = push(&mut arena, -0.5);
        manager.add(emit, a).unwrap();
        manager.replace(emit, a, b).unwrap();

        let list = manager.emitting_list();
        assert_eq!(list.iterate(), &[b]);
    }

    #[test]
    fn test_emitting_list_take_clears_slot() {
        let emit = StateClassId(1);
        let mut manager = ActiveListManager::new(vec![emit], emit);
        let mut arena = TokenArena::new();
        let a = push(&mut arena, -1.0);
        manager.add(emit, a).unwrap();

        let list = manager.emitting_list();
        assert_eq!(list.size(), 1);
        assert_eq!(manager.emitting_list().size(), 0);
    }
}
