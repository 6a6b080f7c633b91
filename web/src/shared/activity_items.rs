use yew::prelude::*;

use crate::types::ActivityRow;

fn raw_markup(markup: &str) -> Html {
    Html::from_html_unchecked(AttrValue::from(markup.to_owned()))
}

#[derive(Properties, Clone, PartialEq, Eq)]
pub struct ItemProps {
    pub row: ActivityRow,
}

#[function_component(ActivityItem)]
pub fn activity_item(props: &ItemProps) -> Html {
    let row = &props.row;

    html! {
        <div class="cf-table-wrapper" data-identifier={row.identifier.clone()}>
            <table class="comment-table">
                <tbody>
                    <tr>
                        <td style="width: 8em">
                            <div>
                                <a href={row.commentator_url.clone()} style="position: relative">
                                    <img src={row.avatar_url.clone()} alt="" />
                                </a>
                                <div>
                                    <a href={row.commentator_url.clone()}>{ row.commentator_handle.clone() }</a>
                                </div>
                            </div>
                        </td>
                        <td class="cf-td">
                            <div>
                                { "On " }
                                <a href={row.author_url.clone()}>{ row.author_handle.clone() }</a>
                                { " → " }
                                if let Some(link) = &row.comment_link {
                                    <a href={link.clone()}>{ row.title.clone() }</a>
                                } else {
                                    <span>{ row.title.clone() }</span>
                                }
                            </div>
                            <div class="comment-body">{ raw_markup(&row.body) }</div>
                        </td>
                    </tr>
                </tbody>
            </table>
        </div>
    }
}

#[derive(Properties, Clone, PartialEq, Eq)]
pub struct Props {
    pub rows: Vec<ActivityRow>,
}

#[function_component(ActivityItems)]
pub fn activity_items(props: &Props) -> Html {
    html! {
        <div class="item-container">
            { for props.rows.iter().map(|row| html!{ <ActivityItem key={row.key.clone()} row={row.clone()} /> }) }
        </div>
    }
}
