use std::collections::HashMap;

use crate::error::MatjipError;
use crate::location::Coordinates;
use crate::search::ResultItem;

/// Lifecycle of the map attached to one carousel index.
#[derive(Debug)]
pub enum SlotState<B> {
    Unrendered,
    Geocoding,
    Rendered(B),
    Failed(MatjipError),
}

/// Payload-free view of a [`SlotState`].
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Unrendered,
    Geocoding,
    Rendered,
    Failed,
}

/// Proof that the caller won the admission gate for `index` in the current
/// result set. Completing with a ticket from an older set is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTicket {
    pub index: usize,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted(SlotTicket),
    InFlight,
    AlreadyRendered,
    Failed,
}

/// What activating a slide should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationPlan {
    /// Coordinates are known; build the map now.
    Materialize { ticket: SlotTicket, store: Coordinates },
    /// Resolve the address first, then materialize with the same ticket.
    Geocode { ticket: SlotTicket, address: String },
    /// Already rendered; the container may need re-measuring.
    Refresh,
    /// A lookup is in flight or the slot already failed.
    Skip,
    /// Admitted but unrenderable. The slot is now failed.
    Abandoned { index: usize, error: MatjipError },
}

/// Per-index map table with a single-admission gate.
///
/// `Unrendered -> Geocoding` happens at most once per index and result set;
/// `Geocoding` ends in `Rendered` or `Failed`, both terminal.
#[derive(Debug)]
pub struct MapSlots<B> {
    generation: u64,
    slots: HashMap<usize, SlotState<B>>,
}

impl<B> Default for MapSlots<B> {
    fn default() -> Self {
        Self {
            generation: 0,
            slots: HashMap::new(),
        }
    }
}

impl<B> MapSlots<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, index: usize) -> Admission {
        match self.slots.get(&index) {
            Some(SlotState::Geocoding) => Admission::InFlight,
            Some(SlotState::Rendered(_)) => Admission::AlreadyRendered,
            Some(SlotState::Failed(_)) => Admission::Failed,
            Some(SlotState::Unrendered) | None => {
                self.slots.insert(index, SlotState::Geocoding);
                Admission::Admitted(SlotTicket {
                    index,
                    generation: self.generation,
                })
            }
        }
    }

    /// Run the admission gate for `index` and decide how its map gets built.
    /// Each index yields at most one `Materialize` or `Geocode` per result set.
    pub fn plan_activation(
        &mut self,
        index: usize,
        item: &ResultItem,
        sdk_available: bool,
    ) -> ActivationPlan {
        let ticket = match self.admit(index) {
            Admission::Admitted(ticket) => ticket,
            Admission::AlreadyRendered => return ActivationPlan::Refresh,
            Admission::InFlight | Admission::Failed => return ActivationPlan::Skip,
        };
        let error = if !sdk_available {
            MatjipError::Unsupported("Naver Maps SDK")
        } else if let Some(store) = item.direct_coordinates() {
            return ActivationPlan::Materialize { ticket, store };
        } else if let Some(address) = item.geocode_address() {
            return ActivationPlan::Geocode {
                ticket,
                address: address.to_string(),
            };
        } else {
            MatjipError::MissingAddress
        };
        self.fail(ticket, error.clone());
        ActivationPlan::Abandoned { index, error }
    }

    fn is_current(&self, ticket: SlotTicket) -> bool {
        ticket.generation == self.generation
            && matches!(self.slots.get(&ticket.index), Some(SlotState::Geocoding))
    }

    /// Store the binding for an admitted slot. Hands the binding back when the
    /// ticket is stale so the caller can dispose of it.
    pub fn complete(&mut self, ticket: SlotTicket, binding: B) -> Result<(), B> {
        if !self.is_current(ticket) {
            return Err(binding);
        }
        self.slots.insert(ticket.index, SlotState::Rendered(binding));
        Ok(())
    }

    /// Abandon an admitted slot. Returns false for stale tickets.
    pub fn fail(&mut self, ticket: SlotTicket, error: MatjipError) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.slots.insert(ticket.index, SlotState::Failed(error));
        true
    }

    #[cfg(test)]
    pub fn status(&self, index: usize) -> SlotStatus {
        match self.slots.get(&index) {
            None | Some(SlotState::Unrendered) => SlotStatus::Unrendered,
            Some(SlotState::Geocoding) => SlotStatus::Geocoding,
            Some(SlotState::Rendered(_)) => SlotStatus::Rendered,
            Some(SlotState::Failed(_)) => SlotStatus::Failed,
        }
    }

    pub fn binding(&self, index: usize) -> Option<&B> {
        match self.slots.get(&index) {
            Some(SlotState::Rendered(b)) => Some(b),
            _ => None,
        }
    }

    pub fn rendered_mut(&mut self) -> impl Iterator<Item = (usize, &mut B)> {
        self.slots.iter_mut().filter_map(|(i, s)| match s {
            SlotState::Rendered(b) => Some((*i, b)),
            _ => None,
        })
    }

    pub fn rendered_count(&self) -> usize {
        self.slots
            .values()
            .filter(|s| matches!(s, SlotState::Rendered(_)))
            .count()
    }

    /// Start a new result set. Outstanding tickets become stale and the
    /// rendered bindings are returned for teardown.
    pub fn reset(&mut self) -> Vec<B> {
        self.generation += 1;
        self.slots
            .drain()
            .filter_map(|(_, s)| match s {
                SlotState::Rendered(b) => Some(b),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(adm: Admission) -> SlotTicket {
        match adm {
            Admission::Admitted(t) => t,
            other => panic!("expected admission, got {other:?}"),
        }
    }

    #[test]
    fn double_activation_admits_once() {
        let mut slots: MapSlots<&str> = MapSlots::new();
        let t = ticket(slots.admit(2));
        assert_eq!(slots.admit(2), Admission::InFlight);
        assert!(slots.complete(t, "map-2").is_ok());
        assert_eq!(slots.admit(2), Admission::AlreadyRendered);
        assert_eq!(slots.binding(2), Some(&"map-2"));
        assert_eq!(slots.rendered_count(), 1);
    }

    #[test]
    fn failure_is_terminal_and_isolated() {
        let mut slots: MapSlots<&str> = MapSlots::new();
        let t0 = ticket(slots.admit(0));
        assert!(slots.fail(t0, MatjipError::GeocodeNotFound { address: "?".into() }));
        assert_eq!(slots.admit(0), Admission::Failed);
        assert_eq!(slots.status(0), SlotStatus::Failed);

        let t1 = ticket(slots.admit(1));
        assert!(slots.complete(t1, "map-1").is_ok());
        assert_eq!(slots.status(1), SlotStatus::Rendered);
        assert_eq!(slots.status(7), SlotStatus::Unrendered);
    }

    #[test]
    fn stale_ticket_after_reset_is_rejected() {
        let mut slots: MapSlots<&str> = MapSlots::new();
        let old = ticket(slots.admit(0));
        let rendered = ticket(slots.admit(1));
        slots.complete(rendered, "old-map").unwrap();

        let dropped = slots.reset();
        assert_eq!(dropped, vec!["old-map"]);

        let fresh = ticket(slots.admit(0));
        assert_eq!(slots.complete(old, "late"), Err("late"));
        assert!(!slots.fail(old, MatjipError::MissingAddress));
        assert!(slots.complete(fresh, "new-map").is_ok());
        assert_eq!(slots.binding(0), Some(&"new-map"));
    }

    fn server_slide(address: &str) -> ResultItem {
        ResultItem::from_slide_attributes(Some("가게".into()), Some(address.into()), None, None)
    }

    fn geocode_ticket(plan: ActivationPlan) -> SlotTicket {
        match plan {
            ActivationPlan::Geocode { ticket, .. } => ticket,
            other => panic!("expected geocode, got {other:?}"),
        }
    }

    #[test]
    fn first_server_slide_geocodes_once_across_navigation() {
        let mut slots: MapSlots<&str> = MapSlots::new();
        let items = [server_slide("서울 중구 세종대로 110"), server_slide("서울 강남구 강남대로 396")];

        // Binding the server slider activates slide 0; the empty results view
        // mounting afterwards leaves the table alone.
        let first = geocode_ticket(slots.plan_activation(0, &items[0], true));
        assert_eq!(slots.plan_activation(0, &items[0], true), ActivationPlan::Skip);

        // Next and back while the lookup is still pending.
        let second = geocode_ticket(slots.plan_activation(1, &items[1], true));
        assert_eq!(slots.plan_activation(0, &items[0], true), ActivationPlan::Skip);

        assert!(slots.complete(first, "map-0").is_ok());
        assert!(slots.complete(second, "map-1").is_ok());
        assert_eq!(slots.plan_activation(0, &items[0], true), ActivationPlan::Refresh);
        assert_eq!(slots.rendered_count(), 2);
    }

    #[test]
    fn direct_coordinates_skip_the_lookup() {
        let mut slots: MapSlots<&str> = MapSlots::new();
        let item = ResultItem::from_slide_attributes(
            Some("시청".into()),
            None,
            Some("37.5665"),
            Some("126.9780"),
        );
        match slots.plan_activation(0, &item, true) {
            ActivationPlan::Materialize { ticket, store } => {
                assert_eq!(ticket.index, 0);
                assert_eq!((store.latitude, store.longitude), (37.5665, 126.9780));
            }
            other => panic!("expected materialize, got {other:?}"),
        }
    }

    #[test]
    fn unrenderable_slides_fail_without_retry() {
        let mut slots: MapSlots<&str> = MapSlots::new();
        let bare = ResultItem::from_slide_attributes(Some("주소 없음".into()), None, None, None);
        assert_eq!(
            slots.plan_activation(0, &bare, true),
            ActivationPlan::Abandoned {
                index: 0,
                error: MatjipError::MissingAddress
            }
        );
        assert_eq!(slots.plan_activation(0, &bare, true), ActivationPlan::Skip);

        let addressed = server_slide("서울 중구 세종대로 110");
        assert!(matches!(
            slots.plan_activation(1, &addressed, false),
            ActivationPlan::Abandoned {
                error: MatjipError::Unsupported(_),
                ..
            }
        ));
        assert_eq!(slots.status(1), SlotStatus::Failed);
    }

    #[test]
    fn rendered_mut_visits_only_rendered() {
        let mut slots: MapSlots<u32> = MapSlots::new();
        for i in 0..3 {
            let t = ticket(slots.admit(i));
            if i != 1 {
                slots.complete(t, 0).unwrap();
            }
        }
        for (_, b) in slots.rendered_mut() {
            *b += 1;
        }
        assert_eq!(slots.binding(0), Some(&1));
        assert_eq!(slots.binding(1), None);
        assert_eq!(slots.binding(2), Some(&1));
    }
}
