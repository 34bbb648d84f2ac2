//! Email bodies rendered with Handlebars. HTML templates use `{{ }}`
//! so event text typed in by an admin is escaped, the plain-text
//! variants use `{{{ }}}` to keep it as written.

use std::fmt;

use handlebars::Handlebars;

#[derive(Debug)]
pub enum Template {
    JoinConfirmationHtml,
    JoinConfirmationText,
    SubscriberBroadcastHtml,
    SubscriberBroadcastText,
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const JOIN_CONFIRMATION_HTML: &str = r#"
<h2>Bedankt voor je aanmelding!</h2>
<p>Beste {{attendee_name}},</p>
<p>Je hebt je aangemeld voor het volgende evenement:</p>
<div style="margin: 20px 0; padding: 15px; background: #f5f5f5; border-radius: 5px;">
  <h3>{{title}}</h3>
  <p><strong>Wanneer:</strong> {{when}}</p>
  {{#if location}}<p><strong>Waar:</strong> {{location}}</p>{{/if}}
  {{#if description}}<p><strong>Beschrijving:</strong> {{description}}</p>{{/if}}
  {{#if documents}}<div style="margin-top: 15px;"><strong>Documenten:</strong>{{#each documents}}
    <p><a href="{{url}}">{{title}}</a></p>{{/each}}
  </div>{{/if}}
</div>
<p>We kijken ernaar uit je te zien!</p>
"#;

const JOIN_CONFIRMATION_TEXT: &str = r"
Bedankt voor je aanmelding!

Beste {{{attendee_name}}},

Je hebt je aangemeld voor het volgende evenement:

{{{title}}}
Wanneer: {{{when}}}
{{#if location}}Waar: {{{location}}}
{{/if}}{{#if description}}Beschrijving: {{{description}}}
{{/if}}{{#if documents}}
Documenten:
{{#each documents}}{{{title}}}: {{{url}}}
{{/each}}{{/if}}
We kijken ernaar uit je te zien!
";

const SUBSCRIBER_BROADCAST_HTML: &str = r#"
<h2>{{heading}}</h2>
<p>Beste {{subscriber_name}},</p>
<p>{{intro}}</p>
<div style="margin: 20px 0; padding: 15px; background: #f5f5f5; border-radius: 5px;">
  <h3>{{title}}</h3>
  <p><strong>Wanneer:</strong> {{when}}</p>
  <p><strong>Tot:</strong> {{until}}</p>
  {{#if location}}<p><strong>Waar:</strong> {{location}}</p>{{/if}}
  {{#if description}}<p><strong>Beschrijving:</strong> {{description}}</p>{{/if}}
  {{#if min_attendees}}<p><strong>Minimum aantal deelnemers:</strong> {{min_attendees}}</p>{{/if}}
  {{#if documents}}<div style="margin-top: 15px;"><strong>Documenten:</strong>{{#each documents}}
    <p><a href="{{url}}">{{title}}</a></p>{{/each}}
  </div>{{/if}}
</div>
<p><a href="{{app_url}}" style="display: inline-block; padding: 10px 20px; background: #2e7d32; color: #fff; text-decoration: none; border-radius: 5px;">Bekijk de kalender en meld je aan</a></p>
<hr>
<p style="font-size: 12px; color: #666;">Je ontvangt deze e-mail omdat je je hebt ingeschreven voor meldingen over evenementen. Wil je deze meldingen niet meer ontvangen? Open de kalender en schrijf je uit via je profiel.</p>
"#;

const SUBSCRIBER_BROADCAST_TEXT: &str = r"
{{{heading}}}

Beste {{{subscriber_name}}},

{{{intro}}}

{{{title}}}
Wanneer: {{{when}}}
Tot: {{{until}}}
{{#if location}}Waar: {{{location}}}
{{/if}}{{#if description}}Beschrijving: {{{description}}}
{{/if}}{{#if min_attendees}}Minimum aantal deelnemers: {{{min_attendees}}}
{{/if}}{{#if documents}}
Documenten:
{{#each documents}}{{{title}}}: {{{url}}}
{{/each}}{{/if}}
Bekijk de kalender en meld je aan: {{{app_url}}}

--
Je ontvangt deze e-mail omdat je je hebt ingeschreven voor meldingen over evenementen.
Wil je deze meldingen niet meer ontvangen? Open de kalender en schrijf je uit via je profiel.
";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    for (name, source) in [
        (Template::JoinConfirmationHtml, JOIN_CONFIRMATION_HTML),
        (Template::JoinConfirmationText, JOIN_CONFIRMATION_TEXT),
        (Template::SubscriberBroadcastHtml, SUBSCRIBER_BROADCAST_HTML),
        (Template::SubscriberBroadcastText, SUBSCRIBER_BROADCAST_TEXT),
    ] {
        registry
            .register_template_string(&name.to_string(), source)
            .expect("Failed to register template");
    }
    registry
}
