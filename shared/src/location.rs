use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::error::MatjipError;

/// A validated WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, MatjipError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(MatjipError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Axis-aligned lat/lng box, south-west to north-east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl BoundingBox {
    /// Smallest box containing every point. `None` for an empty slice.
    pub fn covering(points: &[Coordinates]) -> Option<Self> {
        let first = points.first()?;
        let mut sw = *first;
        let mut ne = *first;
        for p in &points[1..] {
            sw.latitude = sw.latitude.min(p.latitude);
            sw.longitude = sw.longitude.min(p.longitude);
            ne.latitude = ne.latitude.max(p.latitude);
            ne.longitude = ne.longitude.max(p.longitude);
        }
        Some(Self {
            south_west: sw,
            north_east: ne,
        })
    }

    #[cfg(test)]
    pub fn contains(&self, p: Coordinates) -> bool {
        (self.south_west.latitude..=self.north_east.latitude).contains(&p.latitude)
            && (self.south_west.longitude..=self.north_east.longitude).contains(&p.longitude)
    }
}

type Listener = Rc<dyn Fn(Coordinates)>;

#[derive(Default)]
struct HubState {
    latest: Option<Coordinates>,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Latest known user position plus the callbacks interested in it.
///
/// There is exactly one writer (the geolocation watch). Readers either poll
/// [`LocationHub::latest`] or hold a [`Subscription`]; dropping the
/// subscription unregisters its callback.
#[derive(Clone, Default)]
pub struct LocationHub {
    state: Rc<RefCell<HubState>>,
}

impl LocationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Coordinates> {
        self.state.borrow().latest
    }

    /// Store a new position and notify every subscriber.
    pub fn publish(&self, position: Coordinates) {
        let listeners: Vec<Listener> = {
            let mut state = self.state.borrow_mut();
            state.latest = Some(position);
            state.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        // Callbacks run outside the borrow so they may subscribe or drop
        // subscriptions themselves.
        for listener in listeners {
            listener(position);
        }
    }

    #[must_use = "dropping the subscription immediately unregisters the callback"]
    pub fn subscribe(&self, listener: impl Fn(Coordinates) + 'static) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, Rc::new(listener)));
        Subscription {
            hub: Rc::downgrade(&self.state),
            id,
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

/// Cancellation token for a [`LocationHub`] callback.
pub struct Subscription {
    hub: Weak<RefCell<HubState>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.hub.upgrade() {
            state.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    fn seoul() -> Coordinates {
        Coordinates::new(37.5665, 126.9780).unwrap()
    }

    #[test]
    fn rejects_nan_and_out_of_range() {
        assert!(Coordinates::new(f64::NAN, 126.0).is_err());
        assert!(Coordinates::new(37.0, f64::INFINITY).is_err());
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -181.0).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn bounding_box_covers_store_and_user() {
        let store = seoul();
        let user = Coordinates::new(37.5512, 126.9882).unwrap();
        let bounds = BoundingBox::covering(&[store, user]).unwrap();
        assert_eq!(bounds.south_west, Coordinates::new(37.5512, 126.9780).unwrap());
        assert_eq!(bounds.north_east, Coordinates::new(37.5665, 126.9882).unwrap());
        assert!(bounds.contains(store));
        assert!(bounds.contains(user));
        assert!(BoundingBox::covering(&[]).is_none());
    }

    #[test]
    fn publish_updates_latest_and_notifies() {
        let hub = LocationHub::new();
        let seen = Rc::new(Cell::new(0));
        let seen_cb = seen.clone();
        let _sub = hub.subscribe(move |_| seen_cb.set(seen_cb.get() + 1));

        assert_eq!(hub.latest(), None);
        hub.publish(seoul());
        hub.publish(seoul());
        assert_eq!(hub.latest(), Some(seoul()));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn dropped_subscription_receives_nothing() {
        let hub = LocationHub::new();
        let seen = Rc::new(Cell::new(0));
        let seen_cb = seen.clone();
        let sub = hub.subscribe(move |_| seen_cb.set(seen_cb.get() + 1));
        hub.publish(seoul());
        drop(sub);
        hub.publish(seoul());

        assert_eq!(seen.get(), 1);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn callback_may_drop_its_own_subscription() {
        let hub = LocationHub::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot_cb = slot.clone();
        let calls = Rc::new(Cell::new(0));
        let calls_cb = calls.clone();
        let sub = hub.subscribe(move |_| {
            calls_cb.set(calls_cb.get() + 1);
            slot_cb.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        hub.publish(seoul());
        hub.publish(seoul());
        assert_eq!(calls.get(), 1);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn subscription_outliving_hub_is_harmless() {
        let hub = LocationHub::new();
        let sub = hub.subscribe(|_| {});
        drop(hub);
        drop(sub);
    }
}
