use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, Default)]
struct CueSlot {
    busy_until: u64,
}

#[derive(Clone, Debug)]
pub struct CuePool {
    slots: Vec<CueSlot>,
    // Front is least recently triggered.
    order: VecDeque<usize>,
}

impl CuePool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            slots: vec![CueSlot::default(); size],
            order: (0..size).collect(),
        }
    }

    #[cfg(test)]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn trigger(&mut self, now_tick: u64, duration_ticks: u64) -> usize {
        let pos = self
            .order
            .iter()
            .position(|idx| self.slots[*idx].busy_until <= now_tick)
            .unwrap_or(0);
        let Some(slot) = self.order.remove(pos) else {
            return 0;
        };
        self.order.push_back(slot);
        self.slots[slot] = CueSlot {
            busy_until: now_tick.saturating_add(duration_ticks),
        };
        slot
    }

    #[cfg(test)]
    pub fn is_busy(&self, slot: usize, now_tick: u64) -> bool {
        self.slots
            .get(slot)
            .is_some_and(|entry| entry.busy_until > now_tick)
    }

    #[cfg(test)]
    pub fn active_count(&self, now_tick: u64) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.busy_until > now_tick)
            .count()
    }

    pub fn stop_all(&mut self) {
        for slot in &mut self.slots {
            *slot = CueSlot::default();
        }
    }
}
