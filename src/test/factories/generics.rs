use crate::{
    metadata::{
        flags::{
            GenericParamAttributes, MethodAttributes, MethodImplAttributes, TypeAttributes,
        },
        primitives::CilPrimitiveKind,
        token::Token,
        types::TypeFlavor,
    },
    model::{AnalysisModel, ModelBuilder, NativeTypeRef, ParamDescriptor},
    Result,
};

/// Tokens and indices of [`create_comparable_list`]
pub struct ComparableList {
    pub comparable: Token,
    pub list: Token,
    pub get_item: Token,
    pub sort: Token,
    /// `T` of `IComparable<T>`
    pub comparable_t: u32,
    /// `T` of `List<T>`
    pub list_t: u32,
    /// `U` of `List<T>.Sort<U>`
    pub sort_u: u32,
}

/// `IComparable<T>` and `List<T> where T : IComparable<T>`.
///
/// `List<T>` declares `T get_Item(int)` and `void Sort<U>(U[]) where U : T`. The list type is
/// added before the interface, so its constraint references a type declared later.
pub fn create_comparable_list() -> Result<(AnalysisModel, ComparableList)> {
    let mut builder = ModelBuilder::new("Assembly-CSharp.dll");

    let list = builder.add_type(
        "System.Collections.Generic",
        "List`1",
        TypeAttributes::PUBLIC,
        TypeFlavor::Class,
    );
    let comparable = builder.add_type(
        "System",
        "IComparable`1",
        TypeAttributes::PUBLIC | TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT,
        TypeFlavor::Interface,
    );

    let list_t = builder.add_generic_param(list, "T", GenericParamAttributes::empty())?;
    let comparable_t =
        builder.add_generic_param(comparable, "T", GenericParamAttributes::empty())?;
    builder.add_generic_constraint(
        list,
        list_t,
        NativeTypeRef::TypeDef(comparable).instantiate(vec![NativeTypeRef::Var(list_t)]),
    )?;
    builder.set_base(list, NativeTypeRef::object())?;

    let get_item = builder.add_method(
        list,
        "get_Item",
        MethodAttributes::PUBLIC,
        MethodImplAttributes::empty(),
        NativeTypeRef::Var(list_t),
    )?;
    builder.add_param(
        get_item,
        ParamDescriptor::new("index", NativeTypeRef::Primitive(CilPrimitiveKind::I4)),
    )?;

    let sort = builder.add_method(
        list,
        "Sort",
        MethodAttributes::PUBLIC,
        MethodImplAttributes::empty(),
        NativeTypeRef::void(),
    )?;
    let sort_u = builder.add_generic_param(sort, "U", GenericParamAttributes::empty())?;
    builder.add_generic_constraint(sort, sort_u, NativeTypeRef::Var(list_t))?;
    builder.add_param(
        sort,
        ParamDescriptor::new("items", NativeTypeRef::MVar(sort_u).sz_array()),
    )?;

    let model = builder.build();
    Ok((
        model,
        ComparableList {
            comparable,
            list,
            get_item,
            sort,
            comparable_t,
            list_t,
            sort_u,
        },
    ))
}
