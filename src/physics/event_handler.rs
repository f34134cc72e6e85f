use super::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// A touching pair found during a physics step.
#[derive(Debug, Clone, Copy)]
pub struct ContactEvent {
    pub a: UserData,
    pub b: UserData,
    /// Total impulse exchanged during the step.
    pub impulse: f32,
    /// World-space contact point.
    pub point: Point2<f32>,
}

#[derive(Default)]
pub struct PhysicsEventCollector(Arc<Mutex<Vec<ContactEvent>>>);
impl PhysicsEventCollector {
    pub fn clear(&self) {
        self.0.lock().clear();
    }

    pub fn take(&self) -> Vec<ContactEvent> {
        std::mem::take(&mut *self.0.lock())
    }
}
impl EventHandler for PhysicsEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
    }

    fn handle_contact_force_event(
        &self,
        dt: Real,
        _bodies: &RigidBodySet,
        colliders: &ColliderSet,
        contact_pair: &ContactPair,
        total_force_magnitude: Real,
    ) {
        let (Some(c1), Some(c2)) = (
            colliders.get(contact_pair.collider1),
            colliders.get(contact_pair.collider2),
        ) else {
            return;
        };
        let (Some(a), Some(b)) = (UserData::unpack(c1.user_data), UserData::unpack(c2.user_data))
        else {
            return;
        };

        // Last solver contact, or halfway between the colliders.
        let point = contact_pair
            .manifolds
            .iter()
            .flat_map(|m| m.data.solver_contacts.iter())
            .last()
            .map(|contact| contact.point)
            .unwrap_or_else(|| {
                na::center(
                    &Point2::from(*c1.translation()),
                    &Point2::from(*c2.translation()),
                )
            });

        self.0.lock().push(ContactEvent {
            a,
            b,
            impulse: total_force_magnitude * dt,
            point,
        });
    }
}

#[test]
fn test_overlapping_bodies_report_contact() {
    let mut physics = Physics::new();
    let ball = |id, x| {
        BodyDef::dynamic(SharedShape::ball(0.5), 1.0, UserData::new(ObjId(id), ObjKind::Asteroid))
            .at(Point2::new(x, 0.0), 0.0)
    };
    physics.add_body(ball(1, 0.0));
    physics.add_body(ball(2, 0.6));
    physics.step();

    let events = physics.take_contact_events();
    assert!(!events.is_empty());
    let event = events[0];
    let mut ids = [event.a.id, event.b.id];
    ids.sort();
    assert_eq!(ids, [ObjId(1), ObjId(2)]);
    assert!(event.impulse > 0.0);
    assert!((event.point - Point2::new(0.3, 0.0)).norm() < 0.5);

    assert!(physics.take_contact_events().is_empty());
}
