use crate::error::MatchError;
use crate::model::Zone;

pub const DEFAULT_ZONE_ORDER: [Zone; 3] = [Zone::Home, Zone::Square, Zone::House];

/// Active zone plus the on-screen order of the three zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneSelector {
    order: [Zone; 3],
    active: Zone,
}

impl Default for ZoneSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneSelector {
    pub fn new() -> Self {
        Self {
            order: DEFAULT_ZONE_ORDER,
            active: DEFAULT_ZONE_ORDER[0],
        }
    }

    /// Builds a selector from stored values. An order that is not a permutation of the three
    /// zones falls back to the default order; a missing active zone becomes the first in order.
    pub fn restore(order: &[Zone], active: Option<Zone>) -> Self {
        let order = parse_order(order).unwrap_or(DEFAULT_ZONE_ORDER);
        Self {
            order,
            active: active.unwrap_or(order[0]),
        }
    }

    pub fn active(&self) -> Zone {
        self.active
    }

    pub fn order(&self) -> [Zone; 3] {
        self.order
    }

    /// Zone shown at `position` (0..3) in the current order.
    pub fn at(&self, position: usize) -> Option<Zone> {
        self.order.get(position).copied()
    }

    pub fn set_active(&mut self, zone: Zone) -> Result<(), MatchError> {
        if !self.order.contains(&zone) {
            return Err(MatchError::InvalidZone {
                label: zone.label().to_string(),
            });
        }
        self.active = zone;
        Ok(())
    }

    pub fn set_active_label(&mut self, label: &str) -> Result<(), MatchError> {
        let zone = label.parse::<Zone>()?;
        self.set_active(zone)
    }

    /// Mirrors the piste: first and last swap, the middle zone stays.
    pub fn invert(&mut self) {
        self.order.swap(0, 2);
    }

    /// Back to the first zone of the current order; the order is kept.
    pub fn reset_active(&mut self) {
        self.active = self.order[0];
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn parse_order(order: &[Zone]) -> Option<[Zone; 3]> {
    let order: [Zone; 3] = order.try_into().ok()?;
    let complete = Zone::ALL.iter().all(|zone| order.contains(zone));
    complete.then_some(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_twice_is_identity() {
        let mut zones = ZoneSelector::new();
        zones.invert();
        assert_eq!(zones.order(), [Zone::House, Zone::Square, Zone::Home]);
        zones.invert();
        assert_eq!(zones.order(), DEFAULT_ZONE_ORDER);
    }

    #[test]
    fn invert_keeps_active_zone() {
        let mut zones = ZoneSelector::new();
        zones.set_active(Zone::House).expect("valid zone");
        zones.invert();
        assert_eq!(zones.active(), Zone::House);
        zones.reset_active();
        assert_eq!(zones.active(), Zone::House);
    }

    #[test]
    fn unknown_label_leaves_active_zone() {
        let mut zones = ZoneSelector::new();
        zones.set_active(Zone::Square).expect("valid zone");
        assert!(zones.set_active_label("Corridor").is_err());
        assert_eq!(zones.active(), Zone::Square);
    }

    #[test]
    fn restore_rejects_partial_orders() {
        let zones = ZoneSelector::restore(&[Zone::Home, Zone::Home, Zone::House], None);
        assert_eq!(zones.order(), DEFAULT_ZONE_ORDER);
        let zones = ZoneSelector::restore(&[Zone::House, Zone::Square, Zone::Home], None);
        assert_eq!(zones.active(), Zone::House);
    }
}
