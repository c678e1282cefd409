use crate::{
    metadata::{
        flags::{
            EventAttributes, FieldAttributes, MethodAttributes, MethodImplAttributes,
            ParamAttributes, PropertyAttributes, TypeAttributes,
        },
        primitives::{CilPrimitive, CilPrimitiveKind},
        token::Token,
        types::TypeFlavor,
    },
    model::{AnalysisModel, ModelBuilder, NativeTypeRef, ParamDescriptor},
    Result,
};

/// Tokens of [`create_player`]
pub struct Player {
    pub player: Token,
    pub vector: Token,
    pub health: Token,
    pub lookup: Token,
    pub get_health: Token,
    pub set_health: Token,
    pub get_position: Token,
    pub add_died: Token,
    pub remove_died: Token,
    pub health_property: Token,
    pub died: Token,
}

/// `Game.Player` with a constant field, an RVA field, a property with getter and setter, a
/// value-type returning method, an abstract method and an event. `Game.Vector3` is a value
/// type declared after `Player`.
pub fn create_player() -> Result<(AnalysisModel, Player)> {
    let mut builder = ModelBuilder::new("Assembly-CSharp.dll");
    builder.add_type("", "<Module>", TypeAttributes::empty(), TypeFlavor::Class);

    let player = builder.add_type(
        "Game",
        "Player",
        TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT,
        TypeFlavor::Class,
    );
    let vector = builder.add_type(
        "Game",
        "Vector3",
        TypeAttributes::PUBLIC | TypeAttributes::SEALED,
        TypeFlavor::ValueType,
    );
    builder.set_base(player, NativeTypeRef::object())?;

    let int = || NativeTypeRef::Primitive(CilPrimitiveKind::I4);

    let health = builder.add_field(
        player,
        "MaxHealth",
        FieldAttributes::PUBLIC
            | FieldAttributes::STATIC
            | FieldAttributes::LITERAL
            | FieldAttributes::HAS_DEFAULT,
        int(),
    )?;
    builder.set_field_default(health, CilPrimitive::i4(42))?;

    let lookup = builder.add_field(
        player,
        "Lookup",
        FieldAttributes::PRIVATE | FieldAttributes::STATIC | FieldAttributes::HAS_FIELD_RVA,
        NativeTypeRef::Primitive(CilPrimitiveKind::U1).sz_array(),
    )?;
    builder.set_field_initial_data(lookup, vec![1, 2, 3, 4])?;

    let get_health = builder.add_method(
        player,
        "get_Health",
        MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
        MethodImplAttributes::empty(),
        int(),
    )?;
    let set_health = builder.add_method(
        player,
        "set_Health",
        MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
        MethodImplAttributes::empty(),
        NativeTypeRef::void(),
    )?;
    builder.add_param(set_health, ParamDescriptor::new("value", int()))?;

    let get_position = builder.add_method(
        player,
        "GetPosition",
        MethodAttributes::PUBLIC | MethodAttributes::VIRTUAL | MethodAttributes::ABSTRACT,
        MethodImplAttributes::empty(),
        NativeTypeRef::TypeDef(vector),
    )?;

    let heal = builder.add_method(
        player,
        "Heal",
        MethodAttributes::PUBLIC,
        MethodImplAttributes::empty(),
        NativeTypeRef::TypeDef(vector),
    )?;
    builder.add_param(
        heal,
        ParamDescriptor::new("amount", int()).with_default(CilPrimitive::i4(10)),
    )?;
    builder.add_param(
        heal,
        ParamDescriptor::new("source", NativeTypeRef::TypeDef(player).by_ref())
            .with_flags(ParamAttributes::OUT),
    )?;

    let add_died = builder.add_method(
        player,
        "add_Died",
        MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
        MethodImplAttributes::empty(),
        NativeTypeRef::void(),
    )?;
    let remove_died = builder.add_method(
        player,
        "remove_Died",
        MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
        MethodImplAttributes::empty(),
        NativeTypeRef::void(),
    )?;

    let health_property = builder.add_property(
        player,
        "Health",
        PropertyAttributes::empty(),
        int(),
        Some(get_health),
        Some(set_health),
    )?;
    let died = builder.add_event(
        player,
        "Died",
        EventAttributes::empty(),
        NativeTypeRef::object(),
        Some(add_died),
        Some(remove_died),
        None,
    )?;

    let model = builder.build();
    Ok((
        model,
        Player {
            player,
            vector,
            health,
            lookup,
            get_health,
            set_health,
            get_position,
            add_died,
            remove_died,
            health_property,
            died,
        },
    ))
}
