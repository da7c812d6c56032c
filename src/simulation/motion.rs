//! Per-tick motion and conflict resolution
//!
//! Every vehicle decides against the positions all vehicles had at the start
//! of the tick. Accepted moves are then committed in one pass, oldest vehicle
//! first, so the outcome never depends on the order decisions were made in.

use std::collections::BTreeMap;

use super::intersection::IntersectionSnapshot;
use super::types::{Position, Rect, VehicleId};
use super::vehicle::SimVehicle;

/// What happened during one motion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionReport {
    /// Vehicles that advanced
    pub moved: usize,
    /// Vehicles halted by a signal
    pub held: usize,
    /// Vehicles whose move was cancelled because it would overlap another
    pub blocked: usize,
}

/// Whether the vehicle must halt for its signal this tick
///
/// True when the governing head is not green and the leading edge is within
/// `stop_distance` before the head's stop line.
pub fn held_by_signal(
    vehicle: &SimVehicle,
    snapshot: &IntersectionSnapshot,
    stop_distance: f32,
) -> bool {
    let Some(light) = snapshot.light(vehicle.signal()) else {
        return false;
    };
    if light.green {
        return false;
    }

    let distance = vehicle
        .profile()
        .distance_ahead(&vehicle.rect(), light.stop_line());
    (0.0..stop_distance).contains(&distance)
}

/// Advance every vehicle by at most one step
pub fn resolve_motion(
    vehicles: &mut BTreeMap<VehicleId, SimVehicle>,
    snapshot: &IntersectionSnapshot,
    stop_distance: f32,
) -> MotionReport {
    let mut report = MotionReport::default();

    let start: Vec<(VehicleId, Rect)> = vehicles.iter().map(|(id, v)| (*id, v.rect())).collect();

    // Decide: (id, moving, proposed position)
    let plans: Vec<(VehicleId, bool, Option<Position>)> = vehicles
        .values()
        .map(|vehicle| {
            let moving = !held_by_signal(vehicle, snapshot, stop_distance);
            if !moving {
                return (vehicle.id, false, None);
            }

            let next = vehicle.next_position();
            let footprint = vehicle.rect_at(next);
            let clear = start
                .iter()
                .all(|(other, rect)| *other == vehicle.id || !rect.overlaps(&footprint));

            (vehicle.id, true, clear.then_some(next))
        })
        .collect();

    // Commit
    let mut committed: Vec<Rect> = Vec::new();
    for (id, moving, proposal) in plans {
        let Some(vehicle) = vehicles.get_mut(&id) else {
            continue;
        };
        vehicle.moving = moving;

        let advanced = match proposal {
            Some(next) => {
                let footprint = vehicle.rect_at(next);
                if committed.iter().any(|rect| rect.overlaps(&footprint)) {
                    false
                } else {
                    vehicle.position = next;
                    committed.push(footprint);
                    true
                }
            }
            None => false,
        };

        if advanced {
            report.moved += 1;
        } else if moving {
            report.blocked += 1;
        } else {
            report.held += 1;
        }

        if !advanced && snapshot.is_green(vehicle.signal()) {
            vehicle.stalled_ticks += 1;
        } else {
            vehicle.stalled_ticks = 0;
        }
    }

    report
}
