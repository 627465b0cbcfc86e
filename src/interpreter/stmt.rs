//! Statement execution
//!
//! Every statement produces a `Completion`. Loops, labels and `switch`
//! consume the `Break`/`Continue` completions aimed at them; function
//! bodies consume `Return`. Anything else propagates outward unchanged.

use super::{Evaluator, STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::ast::{
    ForInLeft, ForInStatement, ForInit, ForStatement, Statement, SwitchStatement, TryStatement,
    VariableDeclaration,
};
use crate::error::{ErrorKind, JsError};
use crate::object::{ExoticObject, ObjectRef, Ordinary, Property};
use crate::value::{CheapClone, JsValue, PropertyKey};

/// Completion type for statement execution
#[derive(Debug)]
pub(crate) enum Completion {
    /// Carries the statement's value, if it produced one
    Normal(Option<JsValue>),
    Return(JsValue),
    Break(Option<PropertyKey>),
    Continue(Option<PropertyKey>),
}

impl Completion {
    /// The value a program or eval body yields. Jumps never escape a
    /// program; the parser rejects them, so seeing one here means the tree
    /// was built elsewhere and is malformed.
    pub(crate) fn into_program_value(self) -> Result<JsValue, JsError> {
        match self {
            Completion::Normal(value) => Ok(value.unwrap_or_default()),
            Completion::Return(_) => Err(JsError::internal("return outside of function")),
            Completion::Break(_) => Err(JsError::internal("break outside of loop")),
            Completion::Continue(_) => Err(JsError::internal("continue outside of loop")),
        }
    }
}

/// What a loop does after one run of its body
enum LoopStep {
    Next,
    Exit(Completion),
}

/// Fold one body completion into a loop's state. `labels` are the labels
/// directly on the loop; a labelled `break`/`continue` naming one of them
/// targets this loop.
fn loop_step(completion: Completion, labels: &[PropertyKey], value: &mut Option<JsValue>) -> LoopStep {
    match completion {
        Completion::Normal(v) => {
            if v.is_some() {
                *value = v;
            }
            LoopStep::Next
        }
        Completion::Continue(None) => LoopStep::Next,
        Completion::Continue(Some(label)) if labels.contains(&label) => LoopStep::Next,
        Completion::Break(None) => LoopStep::Exit(Completion::Normal(value.take())),
        Completion::Break(Some(label)) if labels.contains(&label) => {
            LoopStep::Exit(Completion::Normal(value.take()))
        }
        abrupt => LoopStep::Exit(abrupt),
    }
}

impl Evaluator {
    /// Run statements in order, stopping at the first abrupt completion.
    /// A normal run yields the value of the last statement that had one.
    pub(crate) fn execute_statements(&mut self, statements: &[Statement]) -> Result<Completion, JsError> {
        let mut last = None;
        for statement in statements {
            match self.execute_statement(statement)? {
                Completion::Normal(value) => {
                    if value.is_some() {
                        last = value;
                    }
                }
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal(last))
    }

    pub(crate) fn execute_statement(&mut self, statement: &Statement) -> Result<Completion, JsError> {
        self.execute_labelled(statement, &[])
    }

    fn execute_labelled(
        &mut self,
        statement: &Statement,
        labels: &[PropertyKey],
    ) -> Result<Completion, JsError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.execute_inner(statement, labels)
                .map_err(|err| err.at_line(statement.line()))
        })
    }

    fn execute_inner(
        &mut self,
        statement: &Statement,
        labels: &[PropertyKey],
    ) -> Result<Completion, JsError> {
        match statement {
            Statement::VariableDeclaration(decl) => {
                self.execute_variable_declaration(decl)?;
                Ok(Completion::Normal(None))
            }

            // Instantiated when the enclosing body was entered
            Statement::FunctionDeclaration(_) | Statement::Empty(_) => Ok(Completion::Normal(None)),

            Statement::Expression(expr) => {
                let value = self.evaluate(&expr.expression)?;
                Ok(Completion::Normal(Some(value)))
            }

            Statement::Block(block) => self.execute_statements(&block.body),

            Statement::If(stmt) => {
                if self.evaluate(&stmt.test)?.to_boolean() {
                    self.execute_statement(&stmt.consequent)
                } else if let Some(alternate) = &stmt.alternate {
                    self.execute_statement(alternate)
                } else {
                    Ok(Completion::Normal(None))
                }
            }

            Statement::While(stmt) => {
                let mut value = None;
                loop {
                    self.checkpoint()?;
                    if !self.evaluate(&stmt.test)?.to_boolean() {
                        break;
                    }
                    let completion = self.execute_statement(&stmt.body)?;
                    if let LoopStep::Exit(exit) = loop_step(completion, labels, &mut value) {
                        return Ok(exit);
                    }
                }
                Ok(Completion::Normal(value))
            }

            Statement::DoWhile(stmt) => {
                let mut value = None;
                loop {
                    self.checkpoint()?;
                    let completion = self.execute_statement(&stmt.body)?;
                    if let LoopStep::Exit(exit) = loop_step(completion, labels, &mut value) {
                        return Ok(exit);
                    }
                    if !self.evaluate(&stmt.test)?.to_boolean() {
                        break;
                    }
                }
                Ok(Completion::Normal(value))
            }

            Statement::For(stmt) => self.execute_for(stmt, labels),

            Statement::ForIn(stmt) => self.execute_for_in(stmt, labels),

            Statement::With(stmt) => {
                let object = self.evaluate(&stmt.object)?;
                let object = self.to_object(&object)?;
                let mut guard = self.push_scope(object);
                guard.execute_statement(&stmt.body)
            }

            Statement::Switch(stmt) => self.execute_switch(stmt, labels),

            Statement::Try(stmt) => self.execute_try(stmt),

            Statement::Return(stmt) => {
                let value = match &stmt.argument {
                    Some(argument) => self.evaluate(argument)?,
                    None => JsValue::Undefined,
                };
                Ok(Completion::Return(value))
            }

            Statement::Break(stmt) => Ok(Completion::Break(stmt.label.clone())),

            Statement::Continue(stmt) => Ok(Completion::Continue(stmt.label.clone())),

            Statement::Throw(stmt) => {
                let value = self.evaluate(&stmt.argument)?;
                let message = match self.to_string(&value) {
                    Ok(s) => s.to_string(),
                    Err(err) if !err.is_catchable() => return Err(err),
                    Err(_) => value.to_js_string().to_string(),
                };
                Err(JsError::thrown(value, message))
            }

            Statement::Labeled(stmt) => {
                let mut inner_labels = labels.to_vec();
                inner_labels.push(stmt.label.cheap_clone());
                match self.execute_labelled(&stmt.body, &inner_labels)? {
                    Completion::Break(Some(label)) if label == stmt.label => {
                        Ok(Completion::Normal(None))
                    }
                    completion => Ok(completion),
                }
            }
        }
    }

    fn execute_variable_declaration(&mut self, decl: &VariableDeclaration) -> Result<(), JsError> {
        for declarator in &decl.declarations {
            if let Some(init) = &declarator.init {
                let reference = self.resolve_reference(&declarator.name);
                let value = self.evaluate(init)?;
                self.put_value(&reference, value);
            }
        }
        Ok(())
    }

    fn execute_for(&mut self, stmt: &ForStatement, labels: &[PropertyKey]) -> Result<Completion, JsError> {
        match &stmt.init {
            Some(ForInit::Variable(decl)) => self.execute_variable_declaration(decl)?,
            Some(ForInit::Expression(expr)) => {
                self.evaluate(expr)?;
            }
            None => {}
        }

        let mut value = None;
        loop {
            self.checkpoint()?;
            if let Some(test) = &stmt.test {
                if !self.evaluate(test)?.to_boolean() {
                    break;
                }
            }

            let completion = self.execute_statement(&stmt.body)?;
            if let LoopStep::Exit(exit) = loop_step(completion, labels, &mut value) {
                return Ok(exit);
            }

            // `continue` lands here too
            if let Some(update) = &stmt.update {
                self.evaluate(update)?;
            }
        }
        Ok(Completion::Normal(value))
    }

    fn execute_for_in(
        &mut self,
        stmt: &ForInStatement,
        labels: &[PropertyKey],
    ) -> Result<Completion, JsError> {
        if let ForInLeft::Variable(declarator) = &stmt.left {
            if let Some(init) = &declarator.init {
                let reference = self.resolve_reference(&declarator.name);
                let value = self.evaluate(init)?;
                self.put_value(&reference, value);
            }
        }

        let target = self.evaluate(&stmt.right)?;
        if target.is_null_or_undefined() {
            return Ok(Completion::Normal(None));
        }
        let object = self.to_object(&target)?;

        let mut value = None;
        for key in object.enumerate() {
            self.checkpoint()?;
            // Deleted by an earlier iteration
            if !object.has_property(&key) {
                continue;
            }

            let reference = match &stmt.left {
                ForInLeft::Variable(declarator) => self.resolve_reference(&declarator.name),
                ForInLeft::Target(target) => self.evaluate_reference(target)?,
            };
            self.put_value(&reference, JsValue::String(key.name().cheap_clone()));

            let completion = self.execute_statement(&stmt.body)?;
            if let LoopStep::Exit(exit) = loop_step(completion, labels, &mut value) {
                return Ok(exit);
            }
        }
        Ok(Completion::Normal(value))
    }

    fn execute_switch(
        &mut self,
        stmt: &SwitchStatement,
        labels: &[PropertyKey],
    ) -> Result<Completion, JsError> {
        let discriminant = self.evaluate(&stmt.discriminant)?;

        let mut start = None;
        for (index, case) in stmt.cases.iter().enumerate() {
            if let Some(test) = &case.test {
                let candidate = self.evaluate(test)?;
                if discriminant.strict_equals(&candidate) {
                    start = Some(index);
                    break;
                }
            }
        }
        let start = start.or_else(|| stmt.cases.iter().position(|case| case.test.is_none()));
        let Some(start) = start else {
            return Ok(Completion::Normal(None));
        };

        let mut value = None;
        for case in stmt.cases.iter().skip(start) {
            match self.execute_statements(&case.consequent)? {
                Completion::Normal(v) => {
                    if v.is_some() {
                        value = v;
                    }
                }
                Completion::Break(None) => return Ok(Completion::Normal(value)),
                Completion::Break(Some(label)) if labels.contains(&label) => {
                    return Ok(Completion::Normal(value));
                }
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal(value))
    }

    fn execute_try(&mut self, stmt: &TryStatement) -> Result<Completion, JsError> {
        let result = match (self.execute_statements(&stmt.block.body), &stmt.handler) {
            (Err(err), Some(handler)) if err.is_catchable() => {
                let exception = self.error_to_value(err);
                let scope = Ordinary::new(None, ExoticObject::Ordinary);
                scope.define_property(
                    handler.param.cheap_clone(),
                    Property::with_attributes(exception, true, true, false),
                );
                let mut guard = self.push_scope(scope);
                guard.execute_statements(&handler.body.body)
            }
            (result, _) => result,
        };

        let Some(finalizer) = &stmt.finalizer else {
            return result;
        };
        // Cancellation unwinds without running cleanup code
        if let Err(err) = &result {
            if !err.is_catchable() {
                return result;
            }
        }
        match self.execute_statements(&finalizer.body)? {
            Completion::Normal(_) => result,
            abrupt => Ok(abrupt),
        }
    }

    /// The script-visible value of a caught error: the thrown value itself,
    /// or a fresh error object for failures raised by the evaluator.
    pub(crate) fn error_to_value(&mut self, err: JsError) -> JsValue {
        match err.kind() {
            ErrorKind::Thrown { value, .. } => value.cheap_clone(),
            _ => {
                let object: ObjectRef =
                    super::builtins::error::create_error(self, err.class_name(), &err.script_message());
                JsValue::Object(object)
            }
        }
    }
}

