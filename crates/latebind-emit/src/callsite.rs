//! Dynamic call-site emitters.
//!
//! Every binder sequence follows one template:
//!
//! ```text
//!     ldc.i4   <binder flags>
//!     ldstr    <member name>          ; when the operation takes one
//!     <type arguments>                ; invoke-member only
//!     ldtoken  <context>
//!     call     Type::GetTypeFromHandle
//!     <CSharpArgumentInfo[] of receiver + arguments>
//!     call     Binder::<Factory>
//! ```
//!
//! leaving one `CallSiteBinder` on the stack. The cache helpers wrap such a
//! sequence into `CallSite<T>.Create` and a lazily filled static field.

use std::iter;

use latebind_bytecode::InstructionSink;
use latebind_core::{FieldRef, MethodRef, ParamInfo, TypeRef, TypeUniverse};

use crate::array::emit_array;
use crate::branch::begin_branch_if_true;
use crate::error::EmitResult;
use crate::flags::{ArgumentFlags, BinderFlags};
use crate::profile::BinderProfile;
use crate::resolve::MemberResolver;
use crate::runtime::BinderRuntime;
use crate::writer::EmitExt;

/// Emits binder construction and call-site plumbing into any sink.
///
/// Holds no per-body state; one emitter serves every body built against the
/// same universe.
#[derive(Clone)]
pub struct CallSiteEmitter<'u> {
    resolver: MemberResolver<'u>,
    runtime: BinderRuntime,
}

impl<'u> CallSiteEmitter<'u> {
    /// Resolve the binder facility named by `profile`. Fails before anything
    /// is emitted when a factory or helper is missing.
    pub fn new(universe: &'u TypeUniverse, profile: &BinderProfile) -> EmitResult<Self> {
        let runtime = BinderRuntime::resolve(universe, profile)?;
        Ok(Self::with_runtime(universe, runtime))
    }

    pub fn with_runtime(universe: &'u TypeUniverse, runtime: BinderRuntime) -> Self {
        Self {
            resolver: MemberResolver::new(universe),
            runtime,
        }
    }

    pub fn runtime(&self) -> &BinderRuntime {
        &self.runtime
    }

    pub fn resolver(&self) -> MemberResolver<'u> {
        self.resolver
    }

    /// `typeof(ty)`: `ldtoken ty; call Type::GetTypeFromHandle`.
    pub fn emit_type_of<S>(&self, sink: &mut S, ty: &TypeRef) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        sink.load_token(ty.clone())?;
        sink.call(self.runtime.type_from_handle.clone())?;
        Ok(())
    }

    /// One argument descriptor: `CSharpArgumentInfo.Create(flags, name)`.
    pub fn emit_argument_info<S>(
        &self,
        sink: &mut S,
        flags: ArgumentFlags,
        name: Option<&str>,
    ) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        let flags = flags.validate()?;
        sink.load_int(flags.bits() as i32)?;
        match name {
            Some(name) => sink.load_string(name)?,
            None => sink.load_null()?,
        }
        sink.call(self.runtime.argument_info_create.clone())?;
        Ok(())
    }

    pub fn emit_get_member<S>(
        &self,
        sink: &mut S,
        flags: BinderFlags,
        name: &str,
        context: &TypeRef,
    ) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        log::debug!("get-member `{name}`");
        self.emit_binder(
            sink,
            flags,
            Some(name),
            context,
            receiver_only(),
            &self.runtime.factories.get_member,
        )
    }

    /// Assignment through a member. A single value names the member and
    /// binds `SetMember`; several values are an indexed assignment and bind
    /// `SetIndex` without a name.
    pub fn emit_set_member<S>(
        &self,
        sink: &mut S,
        flags: BinderFlags,
        name: &str,
        context: &TypeRef,
        value_count: usize,
    ) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        log::debug!("set-member `{name}` with {value_count} values");
        let descriptors = with_receiver(value_count, ArgumentFlags::USE_COMPILE_TIME_TYPE);
        if value_count == 1 {
            self.emit_binder(
                sink,
                flags,
                Some(name),
                context,
                descriptors,
                &self.runtime.factories.set_member,
            )
        } else {
            self.emit_binder(
                sink,
                flags,
                None,
                context,
                descriptors,
                &self.runtime.factories.set_index,
            )
        }
    }

    /// Read through a member. Without index arguments this is a plain
    /// `GetMember`; with them, `GetIndex` without a name.
    pub fn emit_get_index<S>(
        &self,
        sink: &mut S,
        flags: BinderFlags,
        name: &str,
        context: &TypeRef,
        index_count: usize,
    ) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        log::debug!("get-index `{name}` with {index_count} indices");
        let descriptors = with_receiver(index_count, ArgumentFlags::USE_COMPILE_TIME_TYPE);
        if index_count == 0 {
            self.emit_binder(
                sink,
                flags,
                Some(name),
                context,
                descriptors,
                &self.runtime.factories.get_member,
            )
        } else {
            self.emit_binder(
                sink,
                flags,
                None,
                context,
                descriptors,
                &self.runtime.factories.get_index,
            )
        }
    }

    /// Indexed assignment: receiver, `index_count` indices, then the value.
    pub fn emit_set_index<S>(
        &self,
        sink: &mut S,
        flags: BinderFlags,
        context: &TypeRef,
        index_count: usize,
    ) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        log::debug!("set-index with {index_count} indices");
        self.emit_binder(
            sink,
            flags,
            None,
            context,
            with_receiver(index_count + 1, ArgumentFlags::USE_COMPILE_TIME_TYPE),
            &self.runtime.factories.set_index,
        )
    }

    /// Member invocation. `type_args` are the explicit generic arguments of
    /// the invoked member; `params` describe its formals in order.
    pub fn emit_invoke_member<S>(
        &self,
        sink: &mut S,
        flags: BinderFlags,
        name: &str,
        type_args: &[TypeRef],
        context: &TypeRef,
        params: &[ParamInfo],
    ) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        log::debug!(
            "invoke-member `{name}` with {} parameters, {} type arguments",
            params.len(),
            type_args.len()
        );
        let flags = flags.validate()?;
        sink.load_int(flags.bits() as i32)?;
        sink.load_string(name)?;
        self.emit_type_arguments(sink, type_args)?;
        self.emit_type_of(sink, context)?;
        self.emit_descriptors(sink, parameter_descriptors(params))?;
        sink.call(self.runtime.factories.invoke_member.clone())?;
        Ok(())
    }

    /// Conversion of the operand to `target`. No argument descriptors.
    pub fn emit_convert<S>(
        &self,
        sink: &mut S,
        flags: BinderFlags,
        target: &TypeRef,
        context: &TypeRef,
    ) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        log::debug!("convert to `{}`", self.resolver.universe().display(target));
        let flags = flags.validate()?;
        sink.load_int(flags.bits() as i32)?;
        self.emit_type_of(sink, target)?;
        self.emit_type_of(sink, context)?;
        sink.call(self.runtime.factories.convert.clone())?;
        Ok(())
    }

    /// Delegate-style invocation of the receiver itself.
    pub fn emit_invoke<S>(
        &self,
        sink: &mut S,
        flags: BinderFlags,
        context: &TypeRef,
        params: &[ParamInfo],
    ) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        log::debug!("invoke with {} parameters", params.len());
        self.emit_binder(
            sink,
            flags,
            None,
            context,
            parameter_descriptors(params),
            &self.runtime.factories.invoke,
        )
    }

    /// Event test used before `+=`/`-=` on a dynamic member.
    pub fn emit_is_event<S>(
        &self,
        sink: &mut S,
        flags: BinderFlags,
        name: &str,
        context: &TypeRef,
    ) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        log::debug!("is-event `{name}`");
        let flags = flags.validate()?;
        sink.load_int(flags.bits() as i32)?;
        sink.load_string(name)?;
        self.emit_type_of(sink, context)?;
        sink.call(self.runtime.factories.is_event.clone())?;
        Ok(())
    }

    /// `call CallSite<delegate>::Create` on the binder left on the stack.
    pub fn emit_call_site_create<S>(&self, sink: &mut S, delegate: &TypeRef) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        let create = self.call_site_create(&self.runtime.call_site_of(delegate.clone()))?;
        sink.call(create)?;
        Ok(())
    }

    /// Fill the static call-site field `site` once:
    ///
    /// ```text
    ///     ldsfld   site
    ///     brtrue   Lskip
    ///     <build>                     ; pushes the binder
    ///     call     CallSite<T>::Create
    ///     stsfld   site
    /// Lskip:
    /// ```
    pub fn emit_cached_call_site<S, F>(&self, sink: &mut S, site: &FieldRef, build: F) -> EmitResult
    where
        S: InstructionSink + ?Sized,
        F: FnOnce(&mut S) -> EmitResult,
    {
        log::debug!("cached call site `{}`", site.name);
        let create = self.call_site_create(&site.field_type)?;

        sink.load_static_field(site.clone())?;
        let mut guard = begin_branch_if_true(sink)?;
        build(&mut *guard)?;
        guard.call(create)?;
        guard.store_static_field(site.clone())?;
        guard.release()?;
        Ok(())
    }

    /// Invoke the cached site: `site.Target.Invoke(site, <args>)`.
    ///
    /// `args` pushes the remaining delegate arguments.
    pub fn emit_call_site_invoke<S, F>(&self, sink: &mut S, site: &FieldRef, args: F) -> EmitResult
    where
        S: InstructionSink + ?Sized,
        F: FnOnce(&mut S) -> EmitResult,
    {
        let target = self
            .resolver
            .resolve_field(&site.field_type, &self.runtime.call_site_target)?;
        let invoke = self
            .resolver
            .resolve_method(&target.field_type, &self.runtime.delegate_invoke, None)?;

        sink.load_static_field(site.clone())?;
        sink.load_field(target)?;
        sink.load_static_field(site.clone())?;
        args(&mut *sink)?;
        sink.call_virtual(invoke)?;
        Ok(())
    }

    fn call_site_create(&self, site_type: &TypeRef) -> EmitResult<MethodRef> {
        Ok(self
            .resolver
            .resolve_method(site_type, &self.runtime.call_site_factory, None)?)
    }

    fn emit_binder<S>(
        &self,
        sink: &mut S,
        flags: BinderFlags,
        name: Option<&str>,
        context: &TypeRef,
        descriptors: Vec<ArgumentFlags>,
        factory: &MethodRef,
    ) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        let flags = flags.validate()?;
        sink.load_int(flags.bits() as i32)?;
        if let Some(name) = name {
            sink.load_string(name)?;
        }
        self.emit_type_of(sink, context)?;
        self.emit_descriptors(sink, descriptors)?;
        sink.call(factory.clone())?;
        Ok(())
    }

    fn emit_descriptors<S>(&self, sink: &mut S, descriptors: Vec<ArgumentFlags>) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        let emitters = descriptors
            .into_iter()
            .map(|flags| move |s: &mut S| self.emit_argument_info(s, flags, None));
        emit_array(sink, &self.runtime.argument_info_type, emitters)
    }

    /// `null` for a non-generic member, otherwise `Type[]` of `typeof` loads.
    fn emit_type_arguments<S>(&self, sink: &mut S, type_args: &[TypeRef]) -> EmitResult
    where
        S: InstructionSink + ?Sized,
    {
        if type_args.is_empty() {
            sink.load_null()?;
            return Ok(());
        }
        let emitters = type_args
            .iter()
            .map(|ty| move |s: &mut S| self.emit_type_of(s, ty));
        emit_array(sink, &self.runtime.type_type, emitters)
    }
}

fn receiver_only() -> Vec<ArgumentFlags> {
    vec![ArgumentFlags::NONE]
}

/// Receiver descriptor followed by `count` descriptors with `flags`.
fn with_receiver(count: usize, flags: ArgumentFlags) -> Vec<ArgumentFlags> {
    iter::once(ArgumentFlags::NONE)
        .chain(iter::repeat_n(flags, count))
        .collect()
}

fn parameter_descriptors(params: &[ParamInfo]) -> Vec<ArgumentFlags> {
    iter::once(ArgumentFlags::NONE)
        .chain(params.iter().map(ArgumentFlags::for_parameter))
        .collect()
}
