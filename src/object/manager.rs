use super::*;

/// How an object leaves the near collection.
pub enum Removal {
    /// Gone for good.
    Destroy,
    /// Converted to its far form and kept as a far object.
    Demote,
    /// Converted to its far form which is then handed to the callback.
    Convert(Box<dyn FnOnce(ObjId, Box<dyn FarObject>, &mut ObjCommands)>),
}
impl std::fmt::Debug for Removal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Removal::Destroy => f.write_str("Destroy"),
            Removal::Demote => f.write_str("Demote"),
            Removal::Convert(_) => f.write_str("Convert"),
        }
    }
}

/// Something done to a near object by another one.
#[derive(Debug, Clone, Copy)]
pub enum Interaction {
    Dmg(DmgEvent),
    Force { force: Vector2<f32>, acc: bool },
    Money(f32),
}

/// Deferred structural changes and interactions.
///
/// Filled while near objects are iterated, applied by the [`ObjectManager`]
/// once the iteration is over.
#[derive(Default)]
pub struct ObjCommands {
    next_id: u32,
    adds: IndexMap<ObjId, Box<dyn SolObject>, RandomState>,
    /// Objects replaced in `adds` before they were ever added.
    displaced: Vec<Box<dyn SolObject>>,
    removals: IndexMap<ObjId, Removal, RandomState>,
    far_adds: Vec<(ObjId, Box<dyn FarObject>)>,
    interactions: Vec<(ObjId, Interaction)>,
    reset_delays: bool,
}
impl ObjCommands {
    pub fn reserve_id(&mut self) -> ObjId {
        let id = ObjId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Adding the same id twice before the queues drain keeps the last object.
    /// The first one is disposed of without its `on_remove`.
    pub fn add_delayed(&mut self, id: ObjId, obj: Box<dyn SolObject>) {
        if let Some(old) = self.adds.insert(id, obj) {
            log::debug!("{:?} added twice before drain, keeping the last one", id);
            self.displaced.push(old);
        }
    }

    pub fn remove_delayed(&mut self, id: ObjId) {
        self.remove_delayed_as(id, Removal::Destroy);
    }

    /// Requesting the removal of an object that is already queued for removal does nothing.
    pub fn remove_delayed_as(&mut self, id: ObjId, removal: Removal) {
        if self.removals.contains_key(&id) {
            log::trace!("{:?} already queued for removal", id);
            return;
        }
        self.removals.insert(id, removal);
    }

    pub fn add_far(&mut self, id: ObjId, far: Box<dyn FarObject>) {
        self.far_adds.push((id, far));
    }

    pub fn damage(&mut self, target: ObjId, dmg: DmgEvent) {
        self.interactions.push((target, Interaction::Dmg(dmg)));
    }

    pub fn force(&mut self, target: ObjId, force: Vector2<f32>, acc: bool) {
        self.interactions
            .push((target, Interaction::Force { force, acc }));
    }

    pub fn give_money(&mut self, target: ObjId, amount: f32) {
        self.interactions.push((target, Interaction::Money(amount)));
    }

    /// Every far object is checked for promotion next tick.
    pub fn reset_delays(&mut self) {
        self.reset_delays = true;
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty()
            && self.displaced.is_empty()
            && self.removals.is_empty()
            && self.far_adds.is_empty()
            && self.interactions.is_empty()
            && !self.reset_delays
    }
}

pub struct FarObjData {
    pub id: ObjId,
    pub far: Box<dyn FarObject>,
    /// Seconds until the next promotion check.
    pub delay: f32,
}

/// Owns the physics world, the near and far objects and the deferred queues.
pub struct ObjectManager {
    configs: ObjectManagerConfigs,
    physics: Physics,
    objects: IndexMap<ObjId, Box<dyn SolObject>, RandomState>,
    far_objects: Vec<FarObjData>,
    commands: ObjCommands,
    vecs: VecPool,
    /// Same order as `objects`.
    snapshot: Vec<ObjInfo>,
    tick: u64,
}
impl ObjectManager {
    pub fn new(configs: ObjectManagerConfigs) -> Self {
        Self {
            configs,
            physics: Physics::new(),
            objects: Default::default(),
            far_objects: Default::default(),
            commands: Default::default(),
            vecs: VecPool::new(),
            snapshot: Default::default(),
            tick: 0,
        }
    }

    /// One simulation step.
    pub fn update(&mut self, env: &mut SimEnv) {
        self.tick += 1;

        self.physics.step();
        self.sync_objects();
        self.dispatch_contacts(env);
        self.update_objects(env);
        self.update_far_objects(env);
        self.drain(env);

        self.vecs.assert_balanced("ObjectManager::update");
    }

    fn sync_objects(&mut self) {
        self.snapshot.clear();
        for (&id, obj) in self.objects.iter_mut() {
            obj.sync(&self.physics);
            self.snapshot.push(obj.info(id));
        }
    }

    fn dispatch_contacts(&mut self, env: &mut SimEnv) {
        let events = self.physics.take_contact_events();

        let Self {
            physics,
            objects,
            commands,
            vecs,
            snapshot,
            ..
        } = self;
        let snapshot: &[ObjInfo] = snapshot;

        for event in events {
            if !ContactFilter::should_collide(event.a, event.b) {
                continue;
            }

            for (me, other) in [(event.a, event.b), (event.b, event.a)] {
                let Some(other_idx) = objects.get_index_of(&other.id) else {
                    continue;
                };
                let Some(obj) = objects.get_mut(&me.id) else {
                    continue;
                };

                let mut ctx = UpdateCtx {
                    id: me.id,
                    physics: &mut *physics,
                    commands: &mut *commands,
                    env: &mut *env,
                    vecs: &*vecs,
                    others: snapshot,
                };
                obj.handle_contact(&snapshot[other_idx], event.impulse, event.point, &mut ctx);
            }
        }
    }

    fn update_objects(&mut self, env: &mut SimEnv) {
        let mut removals = Vec::new();

        {
            let Self {
                configs,
                physics,
                objects,
                commands,
                vecs,
                snapshot,
                ..
            } = self;
            let snapshot: &[ObjInfo] = snapshot;

            for (&id, obj) in objects.iter_mut() {
                let mut ctx = UpdateCtx {
                    id,
                    physics: &mut *physics,
                    commands: &mut *commands,
                    env: &mut *env,
                    vecs: &*vecs,
                    others: snapshot,
                };
                obj.update(&mut ctx);
                vecs.assert_balanced(obj.kind().name());

                if obj.should_be_removed(env) {
                    removals.push((id, Removal::Destroy));
                } else if (obj.position() - env.camera).norm() - obj.radius() > configs.far_end_dist
                {
                    removals.push((id, Removal::Demote));
                }
            }
        }

        for (id, removal) in removals {
            self.remove_now(id, removal, env);
        }
    }

    fn remove_now(&mut self, id: ObjId, removal: Removal, env: &mut SimEnv) {
        let Some(mut obj) = self.objects.swap_remove(&id) else {
            log::trace!("{:?} not near, {:?} ignored", id, removal);
            return;
        };

        env.drawables.remove_object(id);
        env.sounds.forget_source(id);

        let mut ctx = UpdateCtx {
            id,
            physics: &mut self.physics,
            commands: &mut self.commands,
            env,
            vecs: &self.vecs,
            others: &[],
        };
        obj.on_remove(&mut ctx);
        self.vecs.assert_balanced(obj.kind().name());

        if obj.has_body() {
            log::error!("{} {:?} still has a body after on_remove", obj.kind().name(), id);
            debug_assert!(false, "body not destroyed by on_remove");
            if let Some(body) = obj.near_body_mut() {
                body.destroy(&mut self.physics);
            }
        }

        match removal {
            Removal::Destroy => {
                log::trace!("{} {:?} destroyed", obj.kind().name(), id);
            }
            Removal::Demote => {
                let kind = obj.kind();
                if let Some(far) = obj.to_far() {
                    log::trace!("{} {:?} demoted", kind.name(), id);
                    self.far_objects.push(FarObjData {
                        id,
                        far,
                        delay: 0.0,
                    });
                } else {
                    log::trace!("{} {:?} dropped when leaving range", kind.name(), id);
                }
            }
            Removal::Convert(f) => {
                let kind = obj.kind();
                if let Some(far) = obj.to_far() {
                    f(id, far, &mut self.commands);
                } else {
                    log::warn!("{} {:?} has no far form to convert", kind.name(), id);
                }
            }
        }
    }

    fn update_far_objects(&mut self, env: &mut SimEnv) {
        let far_begin_dist = self.configs.far_begin_dist;
        let max_move_speed = self.configs.max_move_speed;

        let mut i = 0;
        while i < self.far_objects.len() {
            let data = &mut self.far_objects[i];
            data.far.update(env);

            if let Some((passenger_id, passenger)) = data.far.take_arrived_passenger() {
                log::trace!("{:?} arrived while far", passenger_id);
                self.commands.add_far(passenger_id, passenger);
                self.commands.reset_delays();
                self.far_objects.swap_remove(i);
                continue;
            }

            if data.far.should_be_removed(env) {
                log::trace!("far {} {:?} removed", data.far.kind().name(), data.id);
                self.far_objects.swap_remove(i);
                continue;
            }

            data.delay -= DT;
            if data.delay > 0.0 {
                i += 1;
                continue;
            }

            let dist = (data.far.position() - env.camera).norm() - data.far.radius();
            if dist < far_begin_dist {
                let data = self.far_objects.swap_remove(i);
                log::trace!("{} {:?} promoted", data.far.kind().name(), data.id);
                let near = data.far.to_near(data.id, &mut self.physics);
                self.commands.add_delayed(data.id, near);
                continue;
            }

            data.delay = (dist - far_begin_dist) / (2.0 * max_move_speed);
            i += 1;
        }
    }

    /// Apply the deferred queues. Work queued while draining
    /// (fragments spawned by `on_remove`) is applied in a following pass.
    fn drain(&mut self, env: &mut SimEnv) {
        for _ in 0..self.configs.max_drain_passes {
            if self.commands.is_empty() {
                return;
            }

            for (id, interaction) in std::mem::take(&mut self.commands.interactions) {
                let Some(obj) = self.objects.get_mut(&id) else {
                    log::trace!("{:?} not near, {:?} ignored", id, interaction);
                    continue;
                };
                match interaction {
                    Interaction::Dmg(dmg) => obj.receive_dmg(dmg, env),
                    Interaction::Force { force, acc } => {
                        obj.receive_force(force, acc, &mut self.physics)
                    }
                    Interaction::Money(amount) => obj.receive_money(amount),
                }
            }

            for mut obj in std::mem::take(&mut self.commands.displaced) {
                if let Some(body) = obj.near_body_mut() {
                    body.destroy(&mut self.physics);
                }
            }

            for (id, mut obj) in std::mem::take(&mut self.commands.adds) {
                if self.objects.contains_key(&id) {
                    log::warn!("{:?} is already near, add ignored", id);
                    if let Some(body) = obj.near_body_mut() {
                        body.destroy(&mut self.physics);
                    }
                    continue;
                }
                env.drawables.add_object(id, &obj.drawables());
                self.objects.insert(id, obj);
            }

            for (id, removal) in std::mem::take(&mut self.commands.removals) {
                self.remove_now(id, removal, env);
            }

            for (id, far) in std::mem::take(&mut self.commands.far_adds) {
                self.far_objects.push(FarObjData { id, far, delay: 0.0 });
            }

            if std::mem::take(&mut self.commands.reset_delays) {
                for data in self.far_objects.iter_mut() {
                    data.delay = 0.0;
                }
            }
        }

        if !self.commands.is_empty() {
            log::debug!(
                "queues not empty after {} passes, carried to next tick",
                self.configs.max_drain_passes
            );
        }
    }

    /// Add a near object built right away. It joins the simulation at the end of the next tick.
    pub fn spawn(
        &mut self,
        build: impl FnOnce(ObjId, &mut Physics) -> Box<dyn SolObject>,
    ) -> ObjId {
        let id = self.commands.reserve_id();
        let obj = build(id, &mut self.physics);
        self.commands.add_delayed(id, obj);
        id
    }

    /// Add a far object right away.
    pub fn add_far_now(&mut self, far: Box<dyn FarObject>) -> ObjId {
        let id = self.commands.reserve_id();
        self.far_objects.push(FarObjData { id, far, delay: 0.0 });
        id
    }

    pub fn remove_delayed(&mut self, id: ObjId) {
        self.commands.remove_delayed(id);
    }

    pub fn reset_delays(&mut self) {
        self.commands.reset_delays();
    }

    pub fn commands_mut(&mut self) -> &mut ObjCommands {
        &mut self.commands
    }

    /// Apply queued work without stepping the simulation.
    pub fn flush(&mut self, env: &mut SimEnv) {
        self.drain(env);
    }

    pub fn get(&self, id: ObjId) -> Option<&dyn SolObject> {
        self.objects.get(&id).map(|obj| obj.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjId) -> Option<&mut (dyn SolObject + 'static)> {
        self.objects.get_mut(&id).map(|obj| obj.as_mut())
    }

    pub fn contains(&self, id: ObjId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn far(&self, id: ObjId) -> Option<&FarObjData> {
        self.far_objects.iter().find(|data| data.id == id)
    }

    pub fn near_ids(&self) -> impl Iterator<Item = ObjId> + '_ {
        self.objects.keys().copied()
    }

    pub fn far_objects(&self) -> &[FarObjData] {
        &self.far_objects
    }

    pub fn num_near(&self) -> usize {
        self.objects.len()
    }

    pub fn num_far(&self) -> usize {
        self.far_objects.len()
    }

    /// Where an object is, near, far or carried by another one.
    pub fn position_of(&self, id: ObjId) -> Option<Point2<f32>> {
        if let Some(obj) = self.objects.get(&id) {
            return Some(obj.position());
        }
        if let Some(obj) = self.objects.values().find(|obj| obj.passenger() == Some(id)) {
            return Some(obj.position());
        }
        self.far_objects
            .iter()
            .find(|data| data.id == id || data.far.passenger() == Some(id))
            .map(|data| data.far.position())
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut Physics {
        &mut self.physics
    }

    pub fn vec_pool(&self) -> &VecPool {
        &self.vecs
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn configs(&self) -> &ObjectManagerConfigs {
        &self.configs
    }
}

// ####################################################################################
// ################################### TEST ###########################################
// ####################################################################################

#[cfg(test)]
struct Dummy;
#[cfg(test)]
impl SolObject for Dummy {
    fn kind(&self) -> ObjKind {
        ObjKind::Other
    }
    fn update(&mut self, _ctx: &mut UpdateCtx) {}
    fn should_be_removed(&self, _env: &SimEnv) -> bool {
        false
    }
    fn on_remove(&mut self, _ctx: &mut UpdateCtx) {}
    fn receive_dmg(&mut self, _dmg: DmgEvent, _env: &mut SimEnv) {}
    fn to_far(self: Box<Self>) -> Option<Box<dyn FarObject>> {
        None
    }
    fn position(&self) -> Point2<f32> {
        Point2::origin()
    }
    fn velocity(&self) -> Option<Vector2<f32>> {
        None
    }
    fn angle(&self) -> f32 {
        0.0
    }
    fn radius(&self) -> f32 {
        0.0
    }
    fn drawables(&self) -> Drawables {
        Drawables::new()
    }
}

#[test]
fn test_commands_dedup() {
    let mut commands = ObjCommands::default();
    let a = commands.reserve_id();
    let b = commands.reserve_id();
    assert_ne!(a, b);

    commands.add_delayed(a, Box::new(Dummy));
    commands.add_delayed(a, Box::new(Dummy));
    assert_eq!(commands.adds.len(), 1);
    assert_eq!(commands.displaced.len(), 1);

    commands.remove_delayed(b);
    commands.remove_delayed_as(b, Removal::Demote);
    assert_eq!(commands.removals.len(), 1);
    assert!(matches!(commands.removals[&b], Removal::Destroy));
}

#[test]
fn test_commands_empty() {
    let mut commands = ObjCommands::default();
    assert!(commands.is_empty());
    commands.reset_delays();
    assert!(!commands.is_empty());
}
