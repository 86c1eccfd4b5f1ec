use crate::{GameObject, ObjectData, ObjectState, SceneError, TypeRegistry};
use futures::future::{FutureExt, LocalBoxFuture};
use tessera_ids::{IdSequence, SceneID};
use tessera_io::AssetStore;
use tessera_physics::{PhysicsBinder, PhysicsWorld3D};
use tessera_scene::GameObjectDescriptor;
use tessera_structs::Transform3D;

/// Shared, read-only inputs of one tree build.
pub(crate) struct BuildContext<'a> {
    pub store: &'a AssetStore,
    pub registry: &'a TypeRegistry,
    pub scene: SceneID,
    pub ids: &'a IdSequence,
}

/// Build the scene's root objects in declared order.
///
/// A node error on a root fails the whole build. Deeper node errors only drop the
/// failing subtree (see `build_object`).
pub(crate) async fn build_roots(
    ctx: &BuildContext<'_>,
    physics: &mut PhysicsWorld3D,
    descriptors: &[GameObjectDescriptor],
) -> Result<Vec<GameObject>, SceneError> {
    let mut roots = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let root = build_object(ctx, physics, descriptor, Transform3D::IDENTITY, Vec::new());
        roots.push(root.await?);
    }
    Ok(roots)
}

/// Construct one node, then its children depth-first.
///
/// Models load before the body is bound, so a failing node never leaves a body behind.
/// `expanding` holds the types whose template children are being built above this node.
fn build_object<'a>(
    ctx: &'a BuildContext<'a>,
    physics: &'a mut PhysicsWorld3D,
    descriptor: &'a GameObjectDescriptor,
    parent_world: Transform3D,
    expanding: Vec<String>,
) -> LocalBoxFuture<'a, Result<GameObject, SceneError>> {
    async move {
        let effective = ctx.registry.effective_descriptor(descriptor);
        let name = effective.display_name().to_string();
        if let Some(type_name) = &effective.type_name {
            if expanding.contains(type_name) {
                return Err(SceneError::RecursiveType {
                    object: name,
                    type_name: type_name.clone(),
                });
            }
        }
        let behavior = ctx.registry.create_behavior(&effective);

        let local_transform = effective.local_transform();
        let world_transform = local_transform.under(&parent_world);

        let mut models = Vec::with_capacity(effective.models().len());
        for model in effective.models() {
            let asset = ctx.store.load(&model.src).await.map_err(|source| {
                SceneError::UnknownModelAsset {
                    object: name.clone(),
                    src: model.src.clone(),
                    source,
                }
            })?;
            models.push(asset);
        }

        let (body, body_kind) = match &effective.rigid_body {
            Some(rigid_body) => {
                let handle = physics.bind(rigid_body, &world_transform).map_err(|source| {
                    SceneError::InvalidColliderShape {
                        object: name.clone(),
                        source,
                    }
                })?;
                (Some(handle), Some(rigid_body.kind))
            }
            None => (None, None),
        };

        let data = ObjectData {
            id: ctx.ids.next_object(),
            scene: ctx.scene,
            name,
            type_name: effective.type_name.clone(),
            tags: effective.tags(),
            user_data: effective.user_data(),
            local_transform,
            world_transform,
            models,
            lights: effective.lights().to_vec(),
            body,
            body_kind,
            state: ObjectState::Constructed,
        };
        let mut object = GameObject::new(data, behavior);

        let mut child_expanding = expanding;
        if let Some(type_name) = template_children_of(ctx, descriptor) {
            child_expanding.push(type_name.to_string());
        }
        for child in effective.children() {
            let built = build_object(
                ctx,
                &mut *physics,
                child,
                world_transform,
                child_expanding.clone(),
            );
            match built.await {
                Ok(child) => object.push_child(child),
                Err(err) => {
                    log::warn!(
                        "dropping subtree `{}` under `{}`: {err}",
                        child.display_name(),
                        object.name()
                    );
                }
            }
        }
        Ok(object)
    }
    .boxed_local()
}

/// The node's type, when its children come from that type's template rather than the node.
fn template_children_of<'d>(
    ctx: &BuildContext<'_>,
    descriptor: &'d GameObjectDescriptor,
) -> Option<&'d str> {
    if descriptor.children.is_some() {
        return None;
    }
    let type_name = descriptor.type_name.as_deref()?;
    let template = ctx.registry.template(type_name)?;
    template.children.is_some().then_some(type_name)
}
