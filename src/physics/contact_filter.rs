use super::*;

/// Decides which collider pairs produce a contact response.
///
/// Only reads the packed [`UserData`] of both colliders,
/// so it is safe to call from inside the physics step.
pub struct ContactFilter;
impl ContactFilter {
    pub fn should_collide(a: UserData, b: UserData) -> bool {
        match (a.kind, b.kind) {
            (ObjKind::Projectile, _) => object::projectile::should_collide(a, b),
            (_, ObjKind::Projectile) => object::projectile::should_collide(b, a),
            _ => true,
        }
    }

    fn filter(context: &PairFilterContext) -> bool {
        let (Some(c1), Some(c2)) = (
            context.colliders.get(context.collider1),
            context.colliders.get(context.collider2),
        ) else {
            return false;
        };

        match (UserData::unpack(c1.user_data), UserData::unpack(c2.user_data)) {
            (Some(a), Some(b)) => Self::should_collide(a, b),
            _ => true,
        }
    }
}
impl PhysicsHooks for ContactFilter {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        Self::filter(context).then_some(SolverFlags::COMPUTE_IMPULSES)
    }

    fn filter_intersection_pair(&self, context: &PairFilterContext) -> bool {
        Self::filter(context)
    }
}

#[test]
fn test_non_projectiles_always_collide() {
    let ship = UserData::new(ObjId(1), ObjKind::Ship).with_faction(Some(Faction::Laani));
    let other_ship = UserData::new(ObjId(2), ObjKind::Ship).with_faction(Some(Faction::Laani));
    let asteroid = UserData::new(ObjId(3), ObjKind::Asteroid);

    assert!(ContactFilter::should_collide(ship, other_ship));
    assert!(ContactFilter::should_collide(asteroid, ship));
}

#[test]
fn test_order_does_not_matter() {
    let ship = UserData::new(ObjId(1), ObjKind::Ship).with_faction(Some(Faction::Laani));
    let bullet = UserData::new(ObjId(2), ObjKind::Projectile)
        .with_owner(Some(ObjId(1)))
        .with_faction(Some(Faction::Laani));

    assert!(!ContactFilter::should_collide(bullet, ship));
    assert!(!ContactFilter::should_collide(ship, bullet));
}
